use chrono::Utc;

use super::types::{Draft, DraftPatch, StoreError, ValidationError};
use super::NewsStore;

impl NewsStore {
    // ========================================================================
    // Draft Operations
    // ========================================================================

    /// Drafts, most recently created first.
    pub fn drafts(&self) -> &[Draft] {
        &self.drafts
    }

    pub fn draft(&self, id: &str) -> Option<&Draft> {
        self.drafts.iter().find(|d| d.id == id)
    }

    /// Upsert a draft and stamp `last_saved_at`.
    ///
    /// A new draft takes empty strings, no tags and the default category for
    /// every field `patch` leaves unset. An existing draft only has the `Some`
    /// fields overwritten. Autosave callers are expected to debounce; repeated
    /// calls with the same patch converge on the same content.
    pub fn save_draft(&mut self, id: &str, patch: DraftPatch) -> Result<Draft, StoreError> {
        if id.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "draft id" }.into());
        }
        let now = Utc::now();

        let draft = match self.drafts.iter_mut().find(|d| d.id == id) {
            Some(existing) => {
                apply_patch(existing, patch);
                existing.last_saved_at = now;
                existing.clone()
            }
            None => {
                let mut created = Draft {
                    id: id.to_string(),
                    title: String::new(),
                    description: String::new(),
                    content: String::new(),
                    image_url: String::new(),
                    category: Default::default(),
                    author: String::new(),
                    tags: Vec::new(),
                    source: String::new(),
                    last_saved_at: now,
                    scheduled_for: None,
                };
                apply_patch(&mut created, patch);
                self.drafts.insert(0, created.clone());
                created
            }
        };

        self.persist_drafts();
        tracing::debug!(id, "Saved draft");
        Ok(draft)
    }

    /// Discard a draft. Returns whether one was removed; absence is not an
    /// error because publish and discard may both retire the same draft.
    pub fn delete_draft(&mut self, id: &str) -> bool {
        let before = self.drafts.len();
        self.drafts.retain(|d| d.id != id);
        if self.drafts.len() == before {
            return false;
        }
        self.persist_drafts();
        tracing::debug!(id, "Deleted draft");
        true
    }
}

fn apply_patch(draft: &mut Draft, patch: DraftPatch) {
    if let Some(title) = patch.title {
        draft.title = title;
    }
    if let Some(description) = patch.description {
        draft.description = description;
    }
    if let Some(content) = patch.content {
        draft.content = content;
    }
    if let Some(image_url) = patch.image_url {
        draft.image_url = image_url;
    }
    if let Some(category) = patch.category {
        draft.category = category;
    }
    if let Some(author) = patch.author {
        draft.author = author;
    }
    if let Some(tags) = patch.tags {
        draft.tags = tags;
    }
    if let Some(source) = patch.source {
        draft.source = source;
    }
    if let Some(scheduled_for) = patch.scheduled_for {
        draft.scheduled_for = scheduled_for;
    }
}

// ============================================================================
// Tests
// ============================================================================
