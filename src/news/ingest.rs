use serde::Deserialize;

use super::types::{Capabilities, Category, NewArticle, StoreError};
use super::NewsStore;

/// Article candidate as returned by a remote provider (news search, AI
/// generation). The category is free text until validated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CandidateArticle {
    pub title: String,
    pub description: String,
    pub content: String,
    pub image_url: String,
    pub category: String,
    pub author: String,
    pub tags: Vec<String>,
    pub source: String,
    pub is_breaking: Option<bool>,
    pub is_featured: Option<bool>,
}

/// Outcome counts for one ingestion batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub added: usize,
    /// Title already present (case-insensitive).
    pub skipped: usize,
    /// Unknown category or a blank required field.
    pub rejected: usize,
}

impl NewsStore {
    // ========================================================================
    // Ingestion
    // ========================================================================

    /// Publish provider candidates, skipping titles that already exist.
    ///
    /// Duplicate detection is a case-insensitive exact title match against
    /// the collection as it grows, so repeats inside one batch are skipped
    /// too.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` without `can_edit`, checked once before any
    /// candidate is looked at.
    pub fn ingest<I>(&mut self, caps: Capabilities, candidates: I) -> Result<IngestReport, StoreError>
    where
        I: IntoIterator<Item = CandidateArticle>,
    {
        caps.require_edit("ingest articles")?;
        let mut report = IngestReport::default();

        for candidate in candidates {
            if self.has_title(&candidate.title) {
                tracing::debug!(title = %candidate.title, "Skipped duplicate article");
                report.skipped += 1;
                continue;
            }

            let category = match candidate.category.parse::<Category>() {
                Ok(category) => category,
                Err(e) => {
                    tracing::warn!(title = %candidate.title, error = %e, "Rejected candidate");
                    report.rejected += 1;
                    continue;
                }
            };
            let fields = NewArticle {
                title: candidate.title,
                description: candidate.description,
                content: candidate.content,
                image_url: candidate.image_url,
                category,
                author: candidate.author,
                source: candidate.source,
                tags: candidate.tags,
                is_breaking: candidate.is_breaking.unwrap_or(false),
                is_featured: candidate.is_featured.unwrap_or(false),
            };

            match self.create_article(caps, fields, None) {
                Ok(_) => report.added += 1,
                Err(StoreError::Validation(e)) => {
                    tracing::warn!(error = %e, "Rejected candidate");
                    report.rejected += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            added = report.added,
            skipped = report.skipped,
            rejected = report.rejected,
            "Ingestion completed"
        );
        Ok(report)
    }

    fn has_title(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.articles.iter().any(|a| a.title.to_lowercase() == title)
    }
}

// ============================================================================
// Tests
// ============================================================================
