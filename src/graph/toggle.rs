// Toggle Engine - like/unlike and follow/unfollow as idempotent state
// transitions over the relationship records.
//
// Each toggle is existence-check then mutation. The check and the counter
// delta are not one transaction: two near-simultaneous taps from the same
// user can both observe "absent" and both insert, which inflates the counter
// until reconciliation repairs it. Different-actor toggles never lose counter
// updates because deltas are applied store-side atomically.

use futures::future::try_join_all;
use serde::Serialize;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::graph::SocialGraph;
use crate::models::{current_time_millis, Follow, GraphId, Like};
use crate::viewer::Viewer;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LikeToggle {
    pub liked: bool,
    pub likes_count: i64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FollowToggle {
    pub following: bool,
}

impl SocialGraph {
    /// Like a post, or unlike it if the viewer already has a Like record.
    /// Unliking deletes every matching record, not just one, so a duplicate
    /// pair left behind by an earlier race converges back to "unliked" in a
    /// single call while the counter still moves by exactly -1.
    pub async fn toggle_like(&self, viewer: Viewer, post_id: GraphId) -> AppResult<LikeToggle> {
        let user_id = viewer.require_user("like verses")?;

        self.store
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {} not found", post_id)))?;

        let existing = self.store.likes_by_pair(post_id, user_id).await?;
        let liked = if existing.is_empty() {
            let like = Like {
                id: self.ids.next_id(),
                post_id,
                user_id,
                created_at: current_time_millis(),
            };
            self.store.insert_like(&like).await?;
            self.store.apply_likes_delta(post_id, 1).await?;
            debug!("user {} liked post {}", user_id, post_id);
            true
        } else {
            try_join_all(existing.iter().map(|l| self.store.delete_like(l.id))).await?;
            self.store.apply_likes_delta(post_id, -1).await?;
            debug!(
                "user {} unliked post {} ({} record(s) removed)",
                user_id,
                post_id,
                existing.len()
            );
            false
        };

        // Re-read the cached value after the delta; floor at zero for display
        let likes_count = self
            .store
            .get_post(post_id)
            .await?
            .map(|p| p.display_likes_count())
            .unwrap_or(0);

        Ok(LikeToggle { liked, likes_count })
    }

    /// Follow a user, or unfollow if a Follow record already exists for the
    /// pair. Mutates following_count on the actor and followers_count on the
    /// target, both as atomic deltas.
    pub async fn toggle_follow(
        &self,
        viewer: Viewer,
        following_id: GraphId,
    ) -> AppResult<FollowToggle> {
        let follower_id = viewer.require_user("follow writers")?;
        if follower_id == following_id {
            return Err(AppError::Validation(
                "you cannot follow yourself".to_string(),
            ));
        }

        self.store
            .get_profile(following_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {} not found", following_id)))?;

        let existing = self.store.follows_by_pair(follower_id, following_id).await?;
        let following = if existing.is_empty() {
            let follow = Follow {
                id: self.ids.next_id(),
                follower_id,
                following_id,
                created_at: current_time_millis(),
            };
            self.store.insert_follow(&follow).await?;
            self.store.apply_followers_delta(following_id, 1).await?;
            self.store.apply_following_delta(follower_id, 1).await?;
            debug!("user {} followed user {}", follower_id, following_id);
            true
        } else {
            try_join_all(existing.iter().map(|f| self.store.delete_follow(f.id))).await?;
            self.store.apply_followers_delta(following_id, -1).await?;
            self.store.apply_following_delta(follower_id, -1).await?;
            debug!("user {} unfollowed user {}", follower_id, following_id);
            false
        };

        Ok(FollowToggle { following })
    }
}
