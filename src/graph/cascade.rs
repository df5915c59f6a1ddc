// Cascade Deleter - removes a post's likes and comments before the post.
// Best-effort and non-transactional: deletions within a step run in
// parallel, steps run in order, and a partial failure is surfaced rather
// than rolled back. Children already removed stay gone.

use futures::future::try_join_all;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::graph::SocialGraph;
use crate::models::GraphId;
use crate::viewer::Viewer;

impl SocialGraph {
    /// Delete a post along with every Like and Comment that references it.
    /// Only the author may delete.
    pub async fn delete_post(&self, viewer: Viewer, post_id: GraphId) -> AppResult<()> {
        let actor = viewer.require_user("delete verses")?;
        let post = self
            .store
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {} not found", post_id)))?;
        if post.author_id != actor {
            return Err(AppError::Forbidden(
                "only the author may delete this verse".to_string(),
            ));
        }

        let likes = self.store.likes_for_post(post_id).await?;
        try_join_all(likes.iter().map(|l| self.store.delete_like(l.id)))
            .await
            .map_err(|e| {
                AppError::CascadeFailure(format!(
                    "like cleanup for post {} failed: {}",
                    post_id, e
                ))
            })?;

        let comments = self.store.comments_for_post(post_id).await?;
        try_join_all(comments.iter().map(|c| self.store.delete_comment(c.id)))
            .await
            .map_err(|e| {
                AppError::CascadeFailure(format!(
                    "comment cleanup for post {} failed: {}",
                    post_id, e
                ))
            })?;

        self.store.delete_post(post_id).await.map_err(|e| {
            AppError::CascadeFailure(format!("post {} delete failed after cleanup: {}", post_id, e))
        })?;

        info!(
            "deleted post {} ({} likes, {} comments)",
            post_id,
            likes.len(),
            comments.len()
        );
        Ok(())
    }
}
