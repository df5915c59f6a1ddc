// HTTP surface over the social graph.
// Thin JSON handlers: parse the viewer, call the graph, serialize the result.
// The identity provider puts the authenticated user id in the x-viewer-id
// header; a missing or malformed header means anonymous.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::error::AppError;
use crate::viewer::Viewer;

fn viewer_from_headers(headers: &HeaderMap) -> Viewer {
    headers
        .get("x-viewer-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())
        .map(Viewer::User)
        .unwrap_or(Viewer::Anonymous)
}

// Request types

#[derive(Deserialize)]
pub struct CreateProfileRequest {
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar: String,
}

#[derive(Deserialize)]
pub struct UpdateBioRequest {
    pub bio: String,
}

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_private: bool,
}

#[derive(Deserialize)]
pub struct EditPostRequest {
    pub title: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

// Handlers

async fn create_profile_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    let viewer = viewer_from_headers(&headers);
    let profile = state
        .graph
        .create_profile(viewer, &req.name, &req.username, &req.bio, &req.avatar)
        .await?;
    Ok(Json(json!({ "profile": profile })))
}

async fn profile_view_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(uid): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let viewer = viewer_from_headers(&headers);
    let view = state.graph.profile_view(viewer, uid).await?;
    Ok(Json(json!(view)))
}

async fn update_bio_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(uid): Path<i64>,
    Json(req): Json<UpdateBioRequest>,
) -> Result<Json<Value>, AppError> {
    let viewer = viewer_from_headers(&headers);
    state.graph.update_bio(viewer, uid, &req.bio).await?;
    Ok(Json(json!({ "uid": uid, "updated": true })))
}

async fn toggle_follow_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(uid): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let viewer = viewer_from_headers(&headers);
    let result = state.graph.toggle_follow(viewer, uid).await?;
    Ok(Json(json!(result)))
}

async fn search_users_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Value>, AppError> {
    let results = state.graph.search_by_username_prefix(&params.q).await?;
    Ok(Json(json!({ "results": results })))
}

async fn create_post_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreatePostRequest>,
) -> Result<Json<Value>, AppError> {
    let viewer = viewer_from_headers(&headers);
    let post = state
        .graph
        .create_post(viewer, &req.title, &req.content, req.tags, req.is_private)
        .await?;
    Ok(Json(json!({ "post": post })))
}

async fn post_view_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let viewer = viewer_from_headers(&headers);
    let view = state.graph.post_view(viewer, id).await?;
    Ok(Json(json!(view)))
}

async fn edit_post_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<EditPostRequest>,
) -> Result<Json<Value>, AppError> {
    let viewer = viewer_from_headers(&headers);
    state
        .graph
        .edit_post(viewer, id, &req.title, &req.content)
        .await?;
    Ok(Json(json!({ "id": id, "updated": true })))
}

async fn delete_post_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let viewer = viewer_from_headers(&headers);
    state.graph.delete_post(viewer, id).await?;
    Ok(Json(json!({ "id": id, "deleted": true })))
}

async fn toggle_like_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let viewer = viewer_from_headers(&headers);
    let result = state.graph.toggle_like(viewer, id).await?;
    Ok(Json(json!(result)))
}

async fn add_comment_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<CommentRequest>,
) -> Result<Json<Value>, AppError> {
    let viewer = viewer_from_headers(&headers);
    let comment = state.graph.add_comment(viewer, id, &req.content).await?;
    Ok(Json(json!({ "comment": comment })))
}

pub fn create_graph_router(state: AppState) -> Router {
    Router::new()
        .route("/users", post(create_profile_handler))
        .route("/users/search", get(search_users_handler))
        .route("/users/{uid}", get(profile_view_handler))
        .route("/users/{uid}/bio", put(update_bio_handler))
        .route("/users/{uid}/follow", post(toggle_follow_handler))
        .route("/posts", post(create_post_handler))
        .route("/posts/{id}", get(post_view_handler))
        .route("/posts/{id}", put(edit_post_handler))
        .route("/posts/{id}", delete(delete_post_handler))
        .route("/posts/{id}/like", post(toggle_like_handler))
        .route("/posts/{id}/comments", post(add_comment_handler))
        .with_state(state)
}
