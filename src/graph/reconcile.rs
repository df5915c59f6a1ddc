// Counter Reconciler - read-repair for the cached counters.
// Counts the relationship records, compares against the cached value, and
// overwrites the cache on drift. Tolerates crashed toggles and duplicate
// records without a migration step; idempotent, so a second call in a row is
// a pure read.

use tracing::info;

use crate::error::{AppError, AppResult};
use crate::graph::SocialGraph;
use crate::models::GraphId;

impl SocialGraph {
    /// Recompute a post's like count from the Like records and repair the
    /// cached field if it drifted. Returns the true count.
    pub async fn reconcile_like_count(&self, post_id: GraphId) -> AppResult<i64> {
        let post = self
            .store
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {} not found", post_id)))?;

        let actual = self.store.count_likes(post_id).await?;
        if actual != post.likes_count {
            self.store.set_likes_count(post_id, actual).await?;
            info!(
                "repaired likes_count for post {}: {} -> {}",
                post_id, post.likes_count, actual
            );
        }
        Ok(actual)
    }

    /// Same read-repair for a profile's follower/following counters.
    /// Returns (followers, following).
    pub async fn reconcile_follow_counts(&self, uid: GraphId) -> AppResult<(i64, i64)> {
        let profile = self
            .store
            .get_profile(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {} not found", uid)))?;

        let followers = self.store.count_followers(uid).await?;
        let following = self.store.count_following(uid).await?;
        if followers != profile.followers_count || following != profile.following_count {
            self.store
                .set_follow_counts(uid, followers, following)
                .await?;
            info!(
                "repaired follow counts for user {}: ({}, {}) -> ({}, {})",
                uid, profile.followers_count, profile.following_count, followers, following
            );
        }
        Ok((followers, following))
    }
}
