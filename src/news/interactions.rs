use std::collections::HashSet;

use super::types::Article;
use super::NewsStore;

// ============================================================================
// IdSet
// ============================================================================

/// Insertion-ordered set of article IDs.
///
/// Persisted as a plain JSON array; the order is kept only so snapshots are
/// stable between writes.
#[derive(Debug, Clone, Default)]
pub(crate) struct IdSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl IdSet {
    /// Build from a stored list, collapsing duplicates.
    pub(crate) fn from_ids(ids: Vec<String>) -> Self {
        let mut set = Self::default();
        for id in ids {
            if set.members.insert(id.clone()) {
                set.order.push(id);
            }
        }
        set
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    /// Flip membership, returning whether `id` is now a member.
    pub(crate) fn toggle(&mut self, id: &str) -> bool {
        if self.remove(id) {
            false
        } else {
            self.members.insert(id.to_string());
            self.order.push(id.to_string());
            true
        }
    }

    /// Returns whether `id` was present.
    pub(crate) fn remove(&mut self, id: &str) -> bool {
        if !self.members.remove(id) {
            return false;
        }
        self.order.retain(|existing| existing != id);
        true
    }

    /// Keep only IDs matching `keep`, returning how many were dropped.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let before = self.order.len();
        self.order.retain(|id| keep(id));
        self.members = self.order.iter().cloned().collect();
        before - self.order.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn as_slice(&self) -> &[String] {
        &self.order
    }
}

impl NewsStore {
    // ========================================================================
    // Interaction Operations
    // ========================================================================

    /// Flip the bookmark on an article, returning the new membership.
    ///
    /// Returns `None` and changes nothing if the article does not exist, so a
    /// stale UI reference can never plant a dangling ID.
    pub fn toggle_bookmark(&mut self, article_id: &str) -> Option<bool> {
        if self.article(article_id).is_none() {
            tracing::debug!(article_id, "Ignoring bookmark toggle for unknown article");
            return None;
        }
        let bookmarked = self.bookmarked.toggle(article_id);
        self.persist_bookmarks();
        Some(bookmarked)
    }

    /// Flip the like on an article and move its `likes` counter with it.
    ///
    /// The set and the counter change together in one step; the counter is
    /// clamped at zero when un-liking so earlier drift cannot underflow.
    /// Returns the new membership, or `None` for an unknown article.
    pub fn toggle_like(&mut self, article_id: &str) -> Option<bool> {
        let Some(article) = self.articles.iter_mut().find(|a| a.id == article_id) else {
            tracing::debug!(article_id, "Ignoring like toggle for unknown article");
            return None;
        };
        let liked = self.liked.toggle(article_id);
        article.likes = if liked {
            article.likes.saturating_add(1)
        } else {
            article.likes.saturating_sub(1)
        };

        self.persist_articles();
        self.persist_likes();
        Some(liked)
    }

    /// Count one more view. Every call counts; there is no per-session dedup.
    ///
    /// Returns the new view count, or `None` for an unknown article.
    pub fn increment_views(&mut self, article_id: &str) -> Option<u64> {
        let article = self.articles.iter_mut().find(|a| a.id == article_id)?;
        article.views = article.views.saturating_add(1);
        let views = article.views;
        self.persist_articles();
        Some(views)
    }

    pub fn is_bookmarked(&self, article_id: &str) -> bool {
        self.bookmarked.contains(article_id)
    }

    pub fn is_liked(&self, article_id: &str) -> bool {
        self.liked.contains(article_id)
    }

    pub fn bookmarked_ids(&self) -> &[String] {
        self.bookmarked.as_slice()
    }

    pub fn liked_ids(&self) -> &[String] {
        self.liked.as_slice()
    }

    /// Bookmarked articles in canonical collection order.
    pub fn bookmarked_articles(&self) -> Vec<&Article> {
        self.articles
            .iter()
            .filter(|a| self.bookmarked.contains(&a.id))
            .collect()
    }

    /// Liked articles in canonical collection order.
    pub fn liked_articles(&self) -> Vec<&Article> {
        self.articles
            .iter()
            .filter(|a| self.liked.contains(&a.id))
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::tests::{empty_store, push_article};
    use crate::news::{Capabilities, Category};
    use crate::storage::keys;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_id_set_collapses_duplicates() {
        let set = IdSet::from_ids(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(set.as_slice(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_id_set_retain_reports_dropped() {
        let mut set = IdSet::from_ids(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(set.retain(|id| id != "b"), 1);
        assert!(!set.contains("b"));
        assert_eq!(set.len(), 2);
    }

    #[tokio::test]
    async fn test_toggle_bookmark_twice_restores_state() {
        let (mut store, adapter) = empty_store().await;
        push_article(&mut store, "x", Category::Tech, 0, 0);

        assert_eq!(store.toggle_bookmark("x"), Some(true));
        assert!(store.is_bookmarked("x"));
        assert_eq!(store.toggle_bookmark("x"), Some(false));
        assert!(!store.is_bookmarked("x"));

        store.flush().await;
        assert_eq!(adapter.raw(keys::BOOKMARKS).await, Some("[]".to_string()));
    }

    #[tokio::test]
    async fn test_toggle_bookmark_unknown_article_is_noop() {
        let (mut store, _) = empty_store().await;
        assert_eq!(store.toggle_bookmark("ghost"), None);
        assert!(!store.is_bookmarked("ghost"));
        assert!(store.bookmarked_ids().is_empty());
    }

    #[tokio::test]
    async fn test_like_then_unlike_scenario() {
        let (mut store, _) = empty_store().await;
        let article = store
            .create_article(
                Capabilities::FULL,
                crate::news::tests::fields("X", Category::Tech),
                None,
            )
            .unwrap();
        assert_eq!((article.views, article.likes), (0, 0));

        assert_eq!(store.toggle_like(&article.id), Some(true));
        assert_eq!(store.article(&article.id).unwrap().likes, 1);
        assert!(store.is_liked(&article.id));

        assert_eq!(store.toggle_like(&article.id), Some(false));
        assert_eq!(store.article(&article.id).unwrap().likes, 0);
        assert!(!store.is_liked(&article.id));
    }

    #[tokio::test]
    async fn test_unlike_clamps_drifted_counter() {
        let (mut store, _) = empty_store().await;
        push_article(&mut store, "x", Category::Tech, 0, 0);
        // Simulate a liked set that drifted ahead of the counter
        store.liked = IdSet::from_ids(vec!["x".into()]);

        assert_eq!(store.toggle_like("x"), Some(false));
        assert_eq!(store.article("x").unwrap().likes, 0);
    }

    #[tokio::test]
    async fn test_toggle_like_unknown_article_is_noop() {
        let (mut store, _) = empty_store().await;
        assert_eq!(store.toggle_like("ghost"), None);
        assert!(store.liked_ids().is_empty());
    }

    #[tokio::test]
    async fn test_increment_views_counts_every_call() {
        let (mut store, _) = empty_store().await;
        push_article(&mut store, "x", Category::Tech, 7, 0);

        for _ in 0..5 {
            store.increment_views("x");
        }
        assert_eq!(store.article("x").unwrap().views, 12);
        assert_eq!(store.increment_views("ghost"), None);
    }

    #[tokio::test]
    async fn test_projections_follow_collection_order() {
        let (mut store, _) = empty_store().await;
        push_article(&mut store, "a", Category::Tech, 0, 0);
        push_article(&mut store, "b", Category::Tech, 0, 0);
        push_article(&mut store, "c", Category::Tech, 0, 0);

        store.toggle_bookmark("c");
        store.toggle_bookmark("a");
        store.toggle_like("b");

        let ids: Vec<&str> = store
            .bookmarked_articles()
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(store.liked_articles()[0].id, "b");
    }

    proptest! {
        #[test]
        fn prop_double_toggle_is_identity(initial_likes in 0u64..1000, pre_liked in any::<bool>()) {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            rt.block_on(async {
                let (mut store, _) = empty_store().await;
                push_article(&mut store, "x", Category::Tech, 0, initial_likes);
                if pre_liked {
                    store.liked = IdSet::from_ids(vec!["x".into()]);
                }
                let before = store.article("x").unwrap().likes;

                store.toggle_like("x");
                store.toggle_like("x");
                store.toggle_bookmark("x");
                store.toggle_bookmark("x");

                prop_assert_eq!(store.is_liked("x"), pre_liked);
                prop_assert!(!store.is_bookmarked("x"));
                // A pre-liked article with zero likes clamps on the first toggle
                if !(pre_liked && before == 0) {
                    prop_assert_eq!(store.article("x").unwrap().likes, before);
                }
                Ok::<(), TestCaseError>(())
            })?;
        }

        #[test]
        fn prop_views_increase_by_call_count(start in 0u64..10_000, calls in 0usize..50) {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            rt.block_on(async {
                let (mut store, _) = empty_store().await;
                push_article(&mut store, "x", Category::Tech, start, 0);
                for _ in 0..calls {
                    store.increment_views("x");
                }
                prop_assert_eq!(store.article("x").unwrap().views, start + calls as u64);
                Ok::<(), TestCaseError>(())
            })?;
        }
    }
}
