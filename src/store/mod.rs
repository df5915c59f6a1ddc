// Storage seam for the social graph.
// GraphStore is the document-store contract the graph logic is written
// against: point reads, equality/range queries, inserts, deletes, atomic
// counter deltas, and whole-field overwrites. Counter fields are only ever
// mutated through the delta and overwrite methods, never read-modify-write.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Comment, Follow, GraphId, Like, Post, UserProfile};

pub mod sqlite;

pub use sqlite::SqliteStore;

#[async_trait]
pub trait GraphStore: Send + Sync {
    // === Posts ===
    async fn get_post(&self, id: GraphId) -> AppResult<Option<Post>>;
    async fn insert_post(&self, post: &Post) -> AppResult<()>;
    async fn update_post_content(
        &self,
        id: GraphId,
        title: &str,
        content: &str,
        edited_at: i64,
    ) -> AppResult<()>;
    async fn delete_post(&self, id: GraphId) -> AppResult<bool>;
    async fn posts_by_author(&self, author_id: GraphId) -> AppResult<Vec<Post>>;

    /// Atomic signed delta on the cached likes counter. Applied store-side in
    /// one statement so concurrent deltas never lose updates to each other.
    async fn apply_likes_delta(&self, post_id: GraphId, delta: i64) -> AppResult<()>;

    /// Overwrite the cached likes counter (reconciliation repair path).
    async fn set_likes_count(&self, post_id: GraphId, count: i64) -> AppResult<()>;

    // === Profiles ===
    async fn get_profile(&self, uid: GraphId) -> AppResult<Option<UserProfile>>;
    async fn insert_profile(&self, profile: &UserProfile) -> AppResult<()>;
    async fn update_profile_bio(&self, uid: GraphId, bio: &str) -> AppResult<()>;
    async fn apply_followers_delta(&self, uid: GraphId, delta: i64) -> AppResult<()>;
    async fn apply_following_delta(&self, uid: GraphId, delta: i64) -> AppResult<()>;
    async fn set_follow_counts(
        &self,
        uid: GraphId,
        followers: i64,
        following: i64,
    ) -> AppResult<()>;

    /// Lexicographic half-open range query over the lowercased username
    /// column: every profile with `lower <= username < upper`, ordered by
    /// username. Backs the prefix search.
    async fn profiles_by_username_range(
        &self,
        lower: &str,
        upper: &str,
    ) -> AppResult<Vec<UserProfile>>;

    // === Likes ===
    async fn likes_for_post(&self, post_id: GraphId) -> AppResult<Vec<Like>>;
    /// All Like rows for one (post, user) pair. More than one row means a
    /// prior duplicate-write race; callers are expected to handle that.
    async fn likes_by_pair(&self, post_id: GraphId, user_id: GraphId) -> AppResult<Vec<Like>>;
    async fn count_likes(&self, post_id: GraphId) -> AppResult<i64>;
    async fn insert_like(&self, like: &Like) -> AppResult<()>;
    async fn delete_like(&self, id: GraphId) -> AppResult<bool>;

    // === Follows ===
    async fn follows_by_pair(
        &self,
        follower_id: GraphId,
        following_id: GraphId,
    ) -> AppResult<Vec<Follow>>;
    async fn count_followers(&self, uid: GraphId) -> AppResult<i64>;
    async fn count_following(&self, uid: GraphId) -> AppResult<i64>;
    async fn insert_follow(&self, follow: &Follow) -> AppResult<()>;
    async fn delete_follow(&self, id: GraphId) -> AppResult<bool>;

    // === Comments ===
    async fn comments_for_post(&self, post_id: GraphId) -> AppResult<Vec<Comment>>;
    async fn insert_comment(&self, comment: &Comment) -> AppResult<()>;
    async fn delete_comment(&self, id: GraphId) -> AppResult<bool>;
}
