// SocialGraph - single entry point for all graph operations.
// The toggle, reconciliation, visibility, cascade, and search logic live in
// the submodules; this module owns the facade plus entity CRUD and the read
// paths that compose them.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::id_generator::GraphIdGenerator;
use crate::models::{current_time_millis, Comment, GraphId, Post, UserProfile};
use crate::store::GraphStore;
use crate::viewer::Viewer;

pub mod cascade;
pub mod reconcile;
pub mod search;
pub mod toggle;
pub mod visibility;

pub use visibility::can_view;

pub struct SocialGraph {
    pub(crate) store: Arc<dyn GraphStore>,
    pub(crate) ids: GraphIdGenerator,
}

/// A post prepared for display: guarded, reconciled, with the viewer's like
/// state and the comment thread.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub post: Post,
    pub liked_by_viewer: bool,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub profile: UserProfile,
    pub is_following: bool,
    pub posts: Vec<Post>,
}

impl SocialGraph {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            ids: GraphIdGenerator::new(0),
        }
    }

    pub fn new_with_shard(store: Arc<dyn GraphStore>, shard_id: u16) -> Self {
        Self {
            store,
            ids: GraphIdGenerator::new(shard_id),
        }
    }

    // === Profiles ===

    /// Signup path: the authenticated identity becomes the profile uid.
    /// Usernames are stored lowercased so prefix search stays case-insensitive.
    pub async fn create_profile(
        &self,
        viewer: Viewer,
        name: &str,
        username: &str,
        bio: &str,
        avatar: &str,
    ) -> AppResult<UserProfile> {
        let uid = viewer.require_user("sign up")?;
        let username = username.trim().to_lowercase();
        if username.is_empty() {
            return Err(AppError::Validation("username must not be empty".to_string()));
        }

        let profile = UserProfile {
            uid,
            name: name.trim().to_string(),
            username,
            bio: bio.to_string(),
            avatar: avatar.to_string(),
            followers_count: 0,
            following_count: 0,
            created_at: current_time_millis(),
        };
        self.store.insert_profile(&profile).await?;
        Ok(profile)
    }

    pub async fn update_bio(&self, viewer: Viewer, uid: GraphId, bio: &str) -> AppResult<()> {
        let actor = viewer.require_user("edit your profile")?;
        if actor != uid {
            return Err(AppError::Forbidden(
                "only the profile owner may edit the bio".to_string(),
            ));
        }
        self.store.update_profile_bio(uid, bio).await
    }

    // === Posts ===

    pub async fn create_post(
        &self,
        viewer: Viewer,
        title: &str,
        content: &str,
        tags: Vec<String>,
        is_private: bool,
    ) -> AppResult<Post> {
        let author_id = viewer.require_user("publish verses")?;
        let title = title.trim();
        let content = content.trim();
        if title.is_empty() || content.is_empty() {
            return Err(AppError::Validation(
                "title and content must not be empty".to_string(),
            ));
        }

        let post = Post {
            id: self.ids.next_id(),
            author_id,
            title: title.to_string(),
            content: content.to_string(),
            tags,
            likes_count: 0,
            is_private,
            created_at: current_time_millis(),
            edited_at: None,
        };
        self.store.insert_post(&post).await?;
        Ok(post)
    }

    pub async fn edit_post(
        &self,
        viewer: Viewer,
        post_id: GraphId,
        title: &str,
        content: &str,
    ) -> AppResult<()> {
        let actor = viewer.require_user("edit verses")?;
        let post = self
            .store
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {} not found", post_id)))?;
        if post.author_id != actor {
            return Err(AppError::Forbidden(
                "only the author may edit this verse".to_string(),
            ));
        }

        self.store
            .update_post_content(post_id, title.trim(), content.trim(), current_time_millis())
            .await
    }

    // === Comments ===

    pub async fn add_comment(
        &self,
        viewer: Viewer,
        post_id: GraphId,
        content: &str,
    ) -> AppResult<Comment> {
        let user_id = viewer.require_user("comment")?;
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("comment must not be empty".to_string()));
        }

        let post = self
            .store
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {} not found", post_id)))?;
        if !can_view(&post, viewer) {
            return Err(AppError::Forbidden("this verse is private".to_string()));
        }

        let comment = Comment {
            id: self.ids.next_id(),
            post_id,
            user_id,
            content: content.to_string(),
            created_at: current_time_millis(),
        };
        self.store.insert_comment(&comment).await?;
        Ok(comment)
    }

    // === Read paths ===

    /// Fetch a post for display. The visibility guard runs before anything
    /// else so a denied request leaks neither comments nor like state. The
    /// counter is reconciled opportunistically; a reconcile failure is logged
    /// and skipped, never blocking the read.
    pub async fn post_view(&self, viewer: Viewer, post_id: GraphId) -> AppResult<PostView> {
        let mut post = self
            .store
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {} not found", post_id)))?;
        if !can_view(&post, viewer) {
            return Err(AppError::Forbidden("this verse is private".to_string()));
        }

        match self.reconcile_like_count(post_id).await {
            Ok(actual) => post.likes_count = actual,
            Err(e) => warn!("skipping like-count reconcile for post {}: {}", post_id, e),
        }
        post.likes_count = post.display_likes_count();

        let liked_by_viewer = match viewer.user_id() {
            Some(uid) => !self.store.likes_by_pair(post_id, uid).await?.is_empty(),
            None => false,
        };
        let comments = self.store.comments_for_post(post_id).await?;

        Ok(PostView {
            post,
            liked_by_viewer,
            comments,
        })
    }

    /// Fetch a profile with its visible posts. Private posts are listed only
    /// for the owner; each listed post gets a best-effort counter reconcile.
    pub async fn profile_view(&self, viewer: Viewer, uid: GraphId) -> AppResult<ProfileView> {
        let mut profile = self
            .store
            .get_profile(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {} not found", uid)))?;

        match self.reconcile_follow_counts(uid).await {
            Ok((followers, following)) => {
                profile.followers_count = followers;
                profile.following_count = following;
            }
            Err(e) => warn!("skipping follow-count reconcile for user {}: {}", uid, e),
        }

        let is_following = match viewer.user_id() {
            Some(actor) if actor != uid => {
                !self.store.follows_by_pair(actor, uid).await?.is_empty()
            }
            _ => false,
        };

        let mut posts = Vec::new();
        for mut post in self.store.posts_by_author(uid).await? {
            if !can_view(&post, viewer) {
                continue;
            }
            match self.reconcile_like_count(post.id).await {
                Ok(actual) => post.likes_count = actual,
                Err(e) => warn!("skipping like-count reconcile for post {}: {}", post.id, e),
            }
            post.likes_count = post.display_likes_count();
            posts.push(post);
        }
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(ProfileView {
            profile,
            is_following,
            posts,
        })
    }
}
