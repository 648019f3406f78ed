//! In-process news store.
//!
//! `NewsStore` owns the canonical article collection, the reader's
//! interaction sets, the draft collection and preferences. Every mutation
//! commits in memory first and then queues a whole-collection snapshot on the
//! persistence writer; a failed write is reported through
//! [`NewsStore::persistence_status`] and never rolls back memory.
//!
//! Operations are grouped by concern across the submodules, each adding an
//! `impl NewsStore` block.

mod articles;
mod drafts;
mod ingest;
mod interactions;
mod preferences;
mod search;
mod seed;
mod stats;
mod types;
mod views;

pub use ingest::{CandidateArticle, IngestReport};
pub use search::SearchSort;
pub use seed::demo_articles;
pub use stats::{CategoryViews, NewsStats, TopArticle};
pub use types::{
    AdminRole, Article, ArticlePatch, Capabilities, Category, CategoryFilter, Draft, DraftPatch,
    FontSize, NewArticle, PreferencesPatch, StoreError, ThemeMode, UserPreferences,
    ValidationError,
};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::storage::{keys, KeyValueStore, PersistQueue, PersistenceStatus};
use interactions::IdSet;

/// Default result sizes for the derived views.
pub const DEFAULT_TRENDING_LIMIT: usize = 15;
pub const DEFAULT_BREAKING_LIMIT: usize = 5;
pub const DEFAULT_FEATURED_LIMIT: usize = 10;
pub const DEFAULT_RECOMMENDED_LIMIT: usize = 6;

// ============================================================================
// Options
// ============================================================================

/// Construction-time knobs for [`NewsStore::open`].
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Start from the built-in sample articles when nothing is persisted yet.
    pub seed_demo_content: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            seed_demo_content: true,
        }
    }
}

// ============================================================================
// NewsStore
// ============================================================================

pub struct NewsStore {
    pub(crate) articles: Vec<Article>,
    pub(crate) bookmarked: IdSet,
    pub(crate) liked: IdSet,
    pub(crate) drafts: Vec<Draft>,
    pub(crate) preferences: UserPreferences,
    pub(crate) theme_mode: ThemeMode,
    persist: PersistQueue,
}

impl NewsStore {
    /// Hydrate a store from `adapter` and start its persistence writer.
    ///
    /// Must be called inside a tokio runtime. Absent keys take their defaults;
    /// a key holding corrupt JSON is logged and treated as absent.
    ///
    /// # Errors
    ///
    /// Article and draft records are decoded one by one, so a single bad
    /// record is skipped rather than discarding its whole collection. While
    /// any stored article is unreadable the interaction sets are left as
    /// stored.
    ///
    /// Returns `StoreError::Persistence` if the adapter fails a read. Starting
    /// from defaults in that case would overwrite the persisted data on the
    /// first mutation.
    pub async fn open(
        adapter: Arc<dyn KeyValueStore>,
        options: StoreOptions,
    ) -> Result<Self, StoreError> {
        let (articles, bookmarks, likes, drafts, preferences, theme) = futures::try_join!(
            adapter.get(keys::ARTICLES),
            adapter.get(keys::BOOKMARKS),
            adapter.get(keys::LIKES),
            adapter.get(keys::DRAFTS),
            adapter.get(keys::PREFERENCES),
            adapter.get(keys::THEME_MODE),
        )?;

        let articles_stored = articles.is_some();
        let (articles, articles_intact) = match decode_records::<Article>(keys::ARTICLES, articles)
        {
            Some((records, skipped)) => (records, skipped == 0),
            None if options.seed_demo_content => (demo_articles(), !articles_stored),
            None => (Vec::new(), !articles_stored),
        };
        let bookmark_ids: Vec<String> = decode(keys::BOOKMARKS, bookmarks).unwrap_or_default();
        let like_ids: Vec<String> = decode(keys::LIKES, likes).unwrap_or_default();
        let drafts: Vec<Draft> = decode_records(keys::DRAFTS, drafts)
            .map(|(records, _)| records)
            .unwrap_or_default();
        let preferences: UserPreferences =
            decode(keys::PREFERENCES, preferences).unwrap_or_default();
        let theme_mode = theme
            .and_then(|raw| match raw.trim().trim_matches('"').parse::<ThemeMode>() {
                Ok(mode) => Some(mode),
                Err(e) => {
                    tracing::warn!(key = keys::THEME_MODE, error = %e, "Ignoring stored theme mode");
                    None
                }
            })
            .unwrap_or_default();

        let stored_counts = (bookmark_ids.len(), like_ids.len());
        let mut store = Self {
            articles,
            bookmarked: IdSet::from_ids(bookmark_ids),
            liked: IdSet::from_ids(like_ids),
            drafts,
            preferences,
            theme_mode,
            persist: PersistQueue::spawn(adapter),
        };
        if articles_intact {
            store.repair_interaction_sets(stored_counts);
        } else {
            // IDs of unreadable articles must survive until they can be read again.
            tracing::warn!(
                key = keys::ARTICLES,
                "Stored articles partly unreadable; keeping interaction sets as stored"
            );
        }

        tracing::info!(
            articles = store.articles.len(),
            drafts = store.drafts.len(),
            bookmarks = store.bookmarked.len(),
            likes = store.liked.len(),
            "News store hydrated"
        );
        Ok(store)
    }

    /// Wait until every snapshot queued so far has been handed to the adapter.
    pub async fn flush(&self) {
        self.persist.flush().await;
    }

    /// Write counters and the most recent failure of the persistence mirror.
    pub fn persistence_status(&self) -> PersistenceStatus {
        self.persist.status()
    }

    /// Drop interaction IDs that no longer resolve to an article.
    ///
    /// `stored_counts` are the raw list lengths read from the mirror, before
    /// duplicates were collapsed. A set is persisted only if it changed.
    fn repair_interaction_sets(&mut self, stored_counts: (usize, usize)) {
        let Self {
            articles,
            bookmarked,
            liked,
            ..
        } = self;
        let exists = |id: &str| articles.iter().any(|a| a.id == id);

        let dropped_bookmarks = bookmarked.retain(|id| exists(id));
        let dropped_likes = liked.retain(|id| exists(id));

        if dropped_bookmarks > 0 {
            tracing::warn!(dropped = dropped_bookmarks, "Removed dangling bookmark IDs");
        }
        if dropped_likes > 0 {
            tracing::warn!(dropped = dropped_likes, "Removed dangling like IDs");
        }

        let (stored_bookmarks, stored_likes) = stored_counts;
        if self.bookmarked.len() != stored_bookmarks {
            self.persist_bookmarks();
        }
        if self.liked.len() != stored_likes {
            self.persist_likes();
        }
    }

    // ========================================================================
    // Snapshot Helpers
    // ========================================================================

    fn persist_json<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.persist.set(key, json),
            Err(e) => tracing::warn!(key, error = %e, "Failed to serialize snapshot"),
        }
    }

    pub(crate) fn persist_articles(&self) {
        self.persist_json(keys::ARTICLES, &self.articles);
    }

    pub(crate) fn persist_bookmarks(&self) {
        self.persist_json(keys::BOOKMARKS, self.bookmarked.as_slice());
    }

    pub(crate) fn persist_likes(&self) {
        self.persist_json(keys::LIKES, self.liked.as_slice());
    }

    pub(crate) fn persist_drafts(&self) {
        self.persist_json(keys::DRAFTS, &self.drafts);
    }

    pub(crate) fn persist_preferences(&self) {
        self.persist_json(keys::PREFERENCES, &self.preferences);
    }

    pub(crate) fn persist_theme_mode(&self) {
        self.persist
            .set(keys::THEME_MODE, self.theme_mode.as_str().to_string());
    }
}

/// Parse a stored snapshot, logging and discarding corrupt JSON.
fn decode<T: DeserializeOwned>(key: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Ignoring corrupt snapshot");
            None
        }
    }
}

/// Parse a stored JSON array record by record.
///
/// Returns the readable records and how many were skipped, or `None` if the
/// key is absent or not an array at all.
fn decode_records<T: DeserializeOwned>(key: &str, raw: Option<String>) -> Option<(Vec<T>, usize)> {
    let records: Vec<serde_json::Value> = decode(key, raw)?;
    let total = records.len();
    let readable: Vec<T> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, index, error = %e, "Skipping unreadable record");
                None
            }
        })
        .collect();
    let skipped = total - readable.len();
    Some((readable, skipped))
}

// ============================================================================
// Tests
// ============================================================================
