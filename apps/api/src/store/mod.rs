//! Key/value storage for computed artifacts (signals, source payloads, fit
//! scores).
//!
//! `MemoryStore` is the reference implementation and the default when no
//! database is configured; `PgStore` persists to a single JSONB table.
//! Writes to the same key are last-write-wins.

use anyhow::Result;
use async_trait::async_trait;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Filter for `Store::list`. Keys are returned in ascending order.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub key_prefix: Option<String>,
    pub limit: Option<usize>,
}

impl ListFilter {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: Some(prefix.into()),
            limit: None,
        }
    }

    pub fn matches(&self, key: &str) -> bool {
        self.key_prefix
            .as_deref()
            .map(|p| key.starts_with(p))
            .unwrap_or(true)
    }
}

#[async_trait]
pub trait Store<T>: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<T>>;

    /// Replaces any existing value at `key`.
    async fn put(&self, key: &str, value: T) -> Result<()>;

    async fn list(&self, filter: &ListFilter) -> Result<Vec<T>>;
}

/// Percent-encodes the key separator so ids containing `:` cannot collide.
fn escape_key_part(part: &str) -> String {
    part.replace('%', "%25").replace(':', "%3A")
}

/// Key for a stored fit score.
pub fn fit_score_key(talent_id: &str, job_id: &str) -> String {
    format!("{}:{}", escape_key_part(talent_id), escape_key_part(job_id))
}

/// Matches every stored fit score of one talent.
pub fn fit_scores_of(talent_id: &str) -> ListFilter {
    ListFilter::prefix(format!("{}:", escape_key_part(talent_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_without_prefix_matches_all() {
        assert!(ListFilter::default().matches("anything"));
    }

    #[test]
    fn test_talent_filter_does_not_match_longer_ids() {
        let f = fit_scores_of("t-1");
        assert!(f.matches("t-1:job-9"));
        assert!(!f.matches("t-10:job-9"));
    }

    #[test]
    fn test_fit_score_key() {
        assert_eq!(fit_score_key("t-1", "j-2"), "t-1:j-2");
    }

    #[test]
    fn test_ids_containing_separator_do_not_collide() {
        assert_ne!(fit_score_key("a", "b:c"), fit_score_key("a:b", "c"));
        assert_ne!(fit_score_key("a%3Ab", "c"), fit_score_key("a:b", "c"));
        assert!(!fit_scores_of("a").matches(&fit_score_key("a:b", "c")));
        assert!(fit_scores_of("a:b").matches(&fit_score_key("a:b", "c")));
    }

    #[tokio::test]
    async fn test_scores_of_colon_ids_stay_separate() {
        let store = MemoryStore::<&'static str>::new();
        store.put(&fit_score_key("a", "b:c"), "first").await.unwrap();
        store.put(&fit_score_key("a:b", "c"), "second").await.unwrap();

        assert_eq!(
            store.get(&fit_score_key("a", "b:c")).await.unwrap(),
            Some("first")
        );
        assert_eq!(store.list(&fit_scores_of("a")).await.unwrap(), vec!["first"]);
        assert_eq!(
            store.list(&fit_scores_of("a:b")).await.unwrap(),
            vec!["second"]
        );
    }
}
