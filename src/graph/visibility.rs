// Visibility Guard - gates private verses to their author.

use crate::models::Post;
use crate::viewer::Viewer;

/// Private posts are visible only to their author; everything else is public,
/// including to anonymous viewers. `is_private` defaults to false on posts
/// that never set it, so legacy records read as public.
pub fn can_view(post: &Post, viewer: Viewer) -> bool {
    if !post.is_private {
        return true;
    }
    viewer.user_id() == Some(post.author_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Post;

    fn post(author_id: i64, is_private: bool) -> Post {
        Post {
            id: 1,
            author_id,
            title: "t".to_string(),
            content: "c".to_string(),
            tags: vec![],
            likes_count: 0,
            is_private,
            created_at: 0,
            edited_at: None,
        }
    }

    #[test]
    fn public_post_visible_to_everyone() {
        let p = post(7, false);
        assert!(can_view(&p, Viewer::Anonymous));
        assert!(can_view(&p, Viewer::User(7)));
        assert!(can_view(&p, Viewer::User(8)));
    }

    #[test]
    fn private_post_visible_only_to_author() {
        let p = post(7, true);
        assert!(can_view(&p, Viewer::User(7)));
        assert!(!can_view(&p, Viewer::User(8)));
        assert!(!can_view(&p, Viewer::Anonymous));
    }
}
