use std::sync::Arc;

use verse_graph::graph::SocialGraph;
use verse_graph::models::{current_time_millis, Like, Post, UserProfile};
use verse_graph::store::{GraphStore, SqliteStore};
use verse_graph::viewer::Viewer;
use verse_graph::AppError;

async fn setup() -> (Arc<SqliteStore>, SocialGraph) {
    let store = Arc::new(SqliteStore::new_in_memory().await.unwrap());
    let graph = SocialGraph::new(store.clone());
    (store, graph)
}

async fn signup(graph: &SocialGraph, uid: i64, name: &str, username: &str) -> UserProfile {
    graph
        .create_profile(Viewer::User(uid), name, username, "", "")
        .await
        .unwrap()
}

async fn publish(graph: &SocialGraph, author: i64, title: &str, is_private: bool) -> Post {
    graph
        .create_post(Viewer::User(author), title, "content", vec![], is_private)
        .await
        .unwrap()
}

#[tokio::test]
async fn like_toggle_is_idempotent_pair() {
    let (store, graph) = setup().await;
    signup(&graph, 1, "Ada", "ada").await;
    signup(&graph, 2, "Ben", "ben").await;
    let post = publish(&graph, 1, "first verse", false).await;

    let on = graph.toggle_like(Viewer::User(2), post.id).await.unwrap();
    assert!(on.liked);
    assert_eq!(on.likes_count, 1);

    let off = graph.toggle_like(Viewer::User(2), post.id).await.unwrap();
    assert!(!off.liked);
    assert_eq!(off.likes_count, 0);

    assert!(store.likes_by_pair(post.id, 2).await.unwrap().is_empty());
    assert_eq!(store.get_post(post.id).await.unwrap().unwrap().likes_count, 0);
}

#[tokio::test]
async fn unauthenticated_toggle_is_refused_without_mutation() {
    let (store, graph) = setup().await;
    signup(&graph, 1, "Ada", "ada").await;
    let post = publish(&graph, 1, "verse", false).await;

    let err = graph.toggle_like(Viewer::Anonymous, post.id).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated(_)));
    assert!(store.likes_for_post(post.id).await.unwrap().is_empty());
    assert_eq!(store.get_post(post.id).await.unwrap().unwrap().likes_count, 0);

    let err = graph.toggle_follow(Viewer::Anonymous, 1).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated(_)));
}

#[tokio::test]
async fn toggle_like_on_missing_post_is_refused() {
    let (_store, graph) = setup().await;
    signup(&graph, 1, "Ada", "ada").await;

    let err = graph.toggle_like(Viewer::User(1), 424242).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn like_count_converges_after_reconcile() {
    let (store, graph) = setup().await;
    signup(&graph, 1, "Ada", "ada").await;
    let post = publish(&graph, 1, "verse", false).await;

    for uid in 2..=5 {
        signup(&graph, uid, "u", &format!("user{}", uid)).await;
        graph.toggle_like(Viewer::User(uid), post.id).await.unwrap();
    }
    graph.toggle_like(Viewer::User(2), post.id).await.unwrap(); // unlike

    // Drift the cache to simulate a crashed toggle
    store.apply_likes_delta(post.id, 5).await.unwrap();

    let actual = graph.reconcile_like_count(post.id).await.unwrap();
    assert_eq!(actual, 3);
    assert_eq!(store.get_post(post.id).await.unwrap().unwrap().likes_count, 3);

    // Second reconcile is a pure read
    let again = graph.reconcile_like_count(post.id).await.unwrap();
    assert_eq!(again, 3);
    assert_eq!(store.get_post(post.id).await.unwrap().unwrap().likes_count, 3);
}

#[tokio::test]
async fn unlike_suppresses_duplicate_like_records() {
    let (store, graph) = setup().await;
    signup(&graph, 1, "Ada", "ada").await;
    signup(&graph, 2, "Ben", "ben").await;
    let post = publish(&graph, 1, "verse", false).await;

    graph.toggle_like(Viewer::User(2), post.id).await.unwrap();

    // Simulate a prior double-submission race: a second Like row for the
    // same pair, with the counter inflated to match
    store
        .insert_like(&Like {
            id: 999_999,
            post_id: post.id,
            user_id: 2,
            created_at: current_time_millis(),
        })
        .await
        .unwrap();
    store.apply_likes_delta(post.id, 1).await.unwrap();
    let before = store.get_post(post.id).await.unwrap().unwrap().likes_count;
    assert_eq!(before, 2);

    let result = graph.toggle_like(Viewer::User(2), post.id).await.unwrap();
    assert!(!result.liked);

    // Both records removed, counter moved by exactly -1
    assert!(store.likes_by_pair(post.id, 2).await.unwrap().is_empty());
    let after = store.get_post(post.id).await.unwrap().unwrap().likes_count;
    assert_eq!(after, before - 1);

    // Reconciliation finishes the convergence
    assert_eq!(graph.reconcile_like_count(post.id).await.unwrap(), 0);
}

#[tokio::test]
async fn private_post_is_gated_to_author() {
    let (_store, graph) = setup().await;
    signup(&graph, 1, "Ada", "ada").await;
    signup(&graph, 2, "Ben", "ben").await;
    let post = publish(&graph, 1, "secret verse", true).await;

    assert!(graph.post_view(Viewer::User(1), post.id).await.is_ok());

    let err = graph.post_view(Viewer::User(2), post.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    let err = graph.post_view(Viewer::Anonymous, post.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // Commenting on a verse you cannot view is refused too
    let err = graph
        .add_comment(Viewer::User(2), post.id, "hello")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn profile_listing_filters_private_posts_per_viewer() {
    let (_store, graph) = setup().await;
    signup(&graph, 1, "Ada", "ada").await;
    signup(&graph, 2, "Ben", "ben").await;
    publish(&graph, 1, "public verse", false).await;
    publish(&graph, 1, "private verse", true).await;

    let own = graph.profile_view(Viewer::User(1), 1).await.unwrap();
    assert_eq!(own.posts.len(), 2);

    let other = graph.profile_view(Viewer::User(2), 1).await.unwrap();
    assert_eq!(other.posts.len(), 1);
    assert!(!other.posts[0].is_private);

    let anon = graph.profile_view(Viewer::Anonymous, 1).await.unwrap();
    assert_eq!(anon.posts.len(), 1);
}

#[tokio::test]
async fn cascade_delete_removes_all_children() {
    let (store, graph) = setup().await;
    signup(&graph, 1, "Ada", "ada").await;
    signup(&graph, 2, "Ben", "ben").await;
    signup(&graph, 3, "Cy", "cy").await;
    let post = publish(&graph, 1, "verse", false).await;

    graph.toggle_like(Viewer::User(2), post.id).await.unwrap();
    graph.toggle_like(Viewer::User(3), post.id).await.unwrap();
    graph.add_comment(Viewer::User(2), post.id, "nice").await.unwrap();
    graph.add_comment(Viewer::User(3), post.id, "lovely").await.unwrap();

    // Non-author is refused with no mutation
    let err = graph.delete_post(Viewer::User(2), post.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert!(store.get_post(post.id).await.unwrap().is_some());

    graph.delete_post(Viewer::User(1), post.id).await.unwrap();

    assert!(store.get_post(post.id).await.unwrap().is_none());
    assert!(store.likes_for_post(post.id).await.unwrap().is_empty());
    assert!(store.comments_for_post(post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn username_prefix_search_is_exact_and_case_insensitive() {
    let (_store, graph) = setup().await;
    signup(&graph, 1, "Amy", "Amy").await; // stored lowercased
    signup(&graph, 2, "Amanda", "amanda").await;
    signup(&graph, 3, "Bob", "bob").await;

    let mut names: Vec<String> = graph
        .search_by_username_prefix("am")
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.username)
        .collect();
    names.sort();
    assert_eq!(names, vec!["amanda", "amy"]);

    let mut mixed: Vec<String> = graph
        .search_by_username_prefix("AM")
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.username)
        .collect();
    mixed.sort();
    assert_eq!(mixed, names);

    assert!(graph.search_by_username_prefix("").await.unwrap().is_empty());
    assert!(graph.search_by_username_prefix("  ").await.unwrap().is_empty());
}

#[tokio::test]
async fn follow_toggle_restores_both_counters() {
    let (store, graph) = setup().await;
    signup(&graph, 1, "Ada", "ada").await;
    signup(&graph, 2, "Ben", "ben").await;

    let on = graph.toggle_follow(Viewer::User(1), 2).await.unwrap();
    assert!(on.following);
    assert_eq!(store.get_profile(2).await.unwrap().unwrap().followers_count, 1);
    assert_eq!(store.get_profile(1).await.unwrap().unwrap().following_count, 1);

    let view = graph.profile_view(Viewer::User(1), 2).await.unwrap();
    assert!(view.is_following);

    let off = graph.toggle_follow(Viewer::User(1), 2).await.unwrap();
    assert!(!off.following);
    assert_eq!(store.get_profile(2).await.unwrap().unwrap().followers_count, 0);
    assert_eq!(store.get_profile(1).await.unwrap().unwrap().following_count, 0);
    assert!(store.follows_by_pair(1, 2).await.unwrap().is_empty());
}

#[tokio::test]
async fn self_follow_is_rejected() {
    let (store, graph) = setup().await;
    signup(&graph, 1, "Ada", "ada").await;

    let err = graph.toggle_follow(Viewer::User(1), 1).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(store.get_profile(1).await.unwrap().unwrap().followers_count, 0);
}

#[tokio::test]
async fn follow_counters_are_reconciled_on_drift() {
    let (store, graph) = setup().await;
    signup(&graph, 1, "Ada", "ada").await;
    signup(&graph, 2, "Ben", "ben").await;
    graph.toggle_follow(Viewer::User(1), 2).await.unwrap();

    store.apply_followers_delta(2, 7).await.unwrap();

    let (followers, following) = graph.reconcile_follow_counts(2).await.unwrap();
    assert_eq!((followers, following), (1, 0));
    assert_eq!(store.get_profile(2).await.unwrap().unwrap().followers_count, 1);

    // Repeat run performs no further repair
    assert_eq!(graph.reconcile_follow_counts(2).await.unwrap(), (1, 0));
}

#[tokio::test]
async fn only_the_author_may_edit_and_edits_are_stamped() {
    let (store, graph) = setup().await;
    signup(&graph, 1, "Ada", "ada").await;
    signup(&graph, 2, "Ben", "ben").await;
    let post = publish(&graph, 1, "verse", false).await;

    let err = graph
        .edit_post(Viewer::User(2), post.id, "x", "y")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    graph
        .edit_post(Viewer::User(1), post.id, "new title", "new content")
        .await
        .unwrap();
    let edited = store.get_post(post.id).await.unwrap().unwrap();
    assert_eq!(edited.title, "new title");
    assert!(edited.edited_at.is_some());
}

#[tokio::test]
async fn post_view_reports_liked_state_and_reconciled_count() {
    let (store, graph) = setup().await;
    signup(&graph, 1, "Ada", "ada").await;
    signup(&graph, 2, "Ben", "ben").await;
    let post = publish(&graph, 1, "verse", false).await;
    graph.toggle_like(Viewer::User(2), post.id).await.unwrap();

    // Drift the cache; the read path repairs it
    store.set_likes_count(post.id, 40).await.unwrap();

    let view = graph.post_view(Viewer::User(2), post.id).await.unwrap();
    assert!(view.liked_by_viewer);
    assert_eq!(view.post.likes_count, 1);

    let anon = graph.post_view(Viewer::Anonymous, post.id).await.unwrap();
    assert!(!anon.liked_by_viewer);
}
