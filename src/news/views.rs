use std::cmp::Reverse;

use super::types::{Article, CategoryFilter};
use super::NewsStore;

impl NewsStore {
    // ========================================================================
    // Derived Views
    //
    // Recomputed from the canonical collection on every call and never
    // persisted. Every sort is stable, so ties keep collection order.
    // ========================================================================

    /// Articles matching `filter`; `CategoryFilter::All` returns everything.
    pub fn filter_by_category(&self, filter: impl Into<CategoryFilter>) -> Vec<&Article> {
        let filter = filter.into();
        self.articles
            .iter()
            .filter(|a| filter.matches(a.category))
            .collect()
    }

    /// Top `limit` articles by trending score (`views + likes * 10`).
    pub fn trending(&self, limit: usize) -> Vec<&Article> {
        let mut ranked: Vec<&Article> = self.articles.iter().collect();
        ranked.sort_by_key(|a| Reverse(a.trending_score()));
        ranked.truncate(limit);
        ranked
    }

    pub fn breaking_news(&self, limit: usize) -> Vec<&Article> {
        self.articles
            .iter()
            .filter(|a| a.is_breaking)
            .take(limit)
            .collect()
    }

    pub fn featured_articles(&self, limit: usize) -> Vec<&Article> {
        self.articles
            .iter()
            .filter(|a| a.is_featured)
            .take(limit)
            .collect()
    }

    /// Articles related to `current_id` by category or a shared tag, ranked by
    /// `views + likes`.
    ///
    /// Falls back to [`trending`](Self::trending) when there is no current
    /// article or it cannot be found.
    pub fn recommended(&self, current_id: Option<&str>, limit: usize) -> Vec<&Article> {
        let Some(current) = current_id.and_then(|id| self.article(id)) else {
            return self.trending(limit);
        };

        let mut related: Vec<&Article> = self
            .articles
            .iter()
            .filter(|a| a.id != current.id)
            .filter(|a| a.category == current.category || a.shares_tag_with(current))
            .collect();
        related.sort_by_key(|a| Reverse(a.engagement()));
        related.truncate(limit);
        related
    }
}

// ============================================================================
// Tests
// ============================================================================
