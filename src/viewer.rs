// Viewer context - who is making the request.
// The identity provider hands us an authenticated user id or nothing; the
// graph treats it as an opaque trusted input.

use crate::error::{AppError, AppResult};
use crate::models::GraphId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    User(GraphId),
}

impl Viewer {
    pub fn user_id(&self) -> Option<GraphId> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(id) => Some(*id),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Viewer::Anonymous)
    }

    /// Refuse the operation before any mutation if the caller is anonymous.
    pub fn require_user(&self, action: &str) -> AppResult<GraphId> {
        self.user_id()
            .ok_or_else(|| AppError::Unauthenticated(format!("sign in to {}", action)))
    }
}
