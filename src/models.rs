// Domain model for the verses social graph.
// Counter fields (likes_count, followers_count, following_count) are cached
// derived values over the relationship records, never a source of truth.

use serde::{Deserialize, Serialize};

/// Graph entity/record ID
pub type GraphId = i64;

/// Epoch-millis timestamp
pub type Timestamp = i64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: GraphId,
    pub author_id: GraphId,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    /// Cached count of Like records for this post. Stored raw; clamp with
    /// `display_likes_count` before showing it.
    pub likes_count: i64,
    #[serde(default)]
    pub is_private: bool,
    pub created_at: Timestamp,
    pub edited_at: Option<Timestamp>,
}

impl Post {
    /// The stored counter may drift below zero under racing unlikes; the
    /// floor is applied at display time only.
    pub fn display_likes_count(&self) -> i64 {
        self.likes_count.max(0)
    }
}

/// One user liking one post. The toggle protocol keeps at most one row per
/// (post_id, user_id) pair; the schema does not enforce it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    pub id: GraphId,
    pub post_id: GraphId,
    pub user_id: GraphId,
    pub created_at: Timestamp,
}

/// follower_id follows following_id. Same at-most-one-per-pair rule as Like.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Follow {
    pub id: GraphId,
    pub follower_id: GraphId,
    pub following_id: GraphId,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: GraphId,
    pub post_id: GraphId,
    pub user_id: GraphId,
    pub content: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: GraphId,
    pub name: String,
    /// Stored lowercased at signup; prefix search relies on this.
    pub username: String,
    pub bio: String,
    pub avatar: String,
    /// Cached count of Follow records with following_id == uid
    pub followers_count: i64,
    /// Cached count of Follow records with follower_id == uid
    pub following_count: i64,
    pub created_at: Timestamp,
}

/// Current epoch-millis, used for created_at/edited_at stamps
pub fn current_time_millis() -> Timestamp {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock before epoch")
        .as_millis() as Timestamp
}
