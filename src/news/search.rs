use std::cmp::Reverse;

use super::types::Article;
use super::NewsStore;

/// Secondary ordering applied to search hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchSort {
    /// Canonical collection order.
    #[default]
    Relevance,
    /// Newest `published_at` first.
    Date,
    /// Most viewed first.
    Views,
}

impl NewsStore {
    // ========================================================================
    // Search Operations
    // ========================================================================

    /// Case-insensitive substring search over title, description, content,
    /// author and tags.
    ///
    /// A blank query matches nothing; there is no wildcard.
    pub fn search(&self, query: &str) -> Vec<&Article> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        tracing::debug!(query = %needle, "search_articles linear scan");

        self.articles
            .iter()
            .filter(|a| matches_query(a, &needle))
            .collect()
    }

    pub fn search_sorted(&self, query: &str, sort: SearchSort) -> Vec<&Article> {
        let mut hits = self.search(query);
        match sort {
            SearchSort::Relevance => {}
            SearchSort::Date => hits.sort_by_key(|a| Reverse(a.published_at)),
            SearchSort::Views => hits.sort_by_key(|a| Reverse(a.views)),
        }
        hits
    }
}

/// `needle` must already be lowercased.
fn matches_query(article: &Article, needle: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(needle);
    contains(&article.title)
        || contains(&article.description)
        || contains(&article.content)
        || contains(&article.author)
        || article.tags.iter().any(|t| contains(t))
}

// ============================================================================
// Tests
// ============================================================================
