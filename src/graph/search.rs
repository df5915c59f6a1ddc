// Search Index Accessor - exact prefix lookup over usernames.
// Usernames are stored lowercased, so lowercasing the query makes the match
// case-insensitive. The store runs a half-open lexicographic range
// [prefix, prefix + MAX_CODE_POINT), which captures exactly the usernames
// starting with the prefix.

use crate::error::AppResult;
use crate::graph::SocialGraph;
use crate::models::UserProfile;

/// Bounds for the username range scan. Empty input yields None: an empty
/// prefix would scan the whole collection, so the caller short-circuits.
fn prefix_range(prefix: &str) -> Option<(String, String)> {
    let lower = prefix.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    let upper = format!("{}{}", lower, char::MAX);
    Some((lower, upper))
}

impl SocialGraph {
    /// All profiles whose username starts with `prefix`, one materialized
    /// batch. An empty or whitespace prefix returns an empty result without
    /// issuing a store query.
    pub async fn search_by_username_prefix(&self, prefix: &str) -> AppResult<Vec<UserProfile>> {
        let Some((lower, upper)) = prefix_range(prefix) else {
            return Ok(Vec::new());
        };
        self.store.profiles_by_username_range(&lower, &upper).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_prefixes_yield_no_range() {
        assert!(prefix_range("").is_none());
        assert!(prefix_range("   ").is_none());
    }

    #[test]
    fn range_is_lowercased_and_half_open() {
        let (lower, upper) = prefix_range("Am").unwrap();
        assert_eq!(lower, "am");
        assert!(upper.starts_with("am"));
        assert!("amy".to_string() >= lower && "amy".to_string() < upper);
        assert!("amanda".to_string() >= lower && "amanda".to_string() < upper);
        assert!(!("bob".to_string() < upper && "bob".to_string() >= lower));
    }
}
