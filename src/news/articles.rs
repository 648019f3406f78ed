use chrono::Utc;

use super::types::{Article, ArticlePatch, Capabilities, NewArticle, StoreError};
use super::NewsStore;
use crate::util::reading_time_minutes;

impl NewsStore {
    // ========================================================================
    // Article Queries
    // ========================================================================

    /// Canonical collection, newest first.
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// Look up an article. A missing ID is an ordinary outcome.
    pub fn article(&self, id: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.id == id)
    }

    // ========================================================================
    // Article Mutations
    // ========================================================================

    /// Publish a new article at the head of the collection.
    ///
    /// Assigns a fresh ID, zero counters, the current time and a reading-time
    /// estimate. When `origin_draft` is given the draft is retired in the same
    /// call; its removal is queued after the article snapshot so an
    /// interrupted promotion leaves a duplicate rather than losing content.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` without `can_edit`; `Validation` if a required
    /// field is blank. Nothing changes in either case.
    pub fn create_article(
        &mut self,
        caps: Capabilities,
        fields: NewArticle,
        origin_draft: Option<&str>,
    ) -> Result<Article, StoreError> {
        caps.require_edit("create articles")?;
        fields.validate()?;

        let article = Article {
            id: self.next_article_id(),
            reading_time: reading_time_minutes(&fields.content),
            title: fields.title,
            description: fields.description,
            content: fields.content,
            image_url: fields.image_url,
            category: fields.category,
            author: fields.author,
            source: fields.source,
            tags: fields.tags,
            published_at: Utc::now(),
            views: 0,
            likes: 0,
            is_breaking: fields.is_breaking,
            is_featured: fields.is_featured,
        };

        self.articles.insert(0, article.clone());
        self.persist_articles();

        if let Some(draft_id) = origin_draft {
            self.delete_draft(draft_id);
        }

        tracing::debug!(id = %article.id, category = %article.category, "Created article");
        Ok(article)
    }

    /// Merge `patch` into an existing article.
    ///
    /// Returns `Ok(false)` if no article has `id`. Changing `content`
    /// recomputes the reading time.
    pub fn update_article(
        &mut self,
        caps: Capabilities,
        id: &str,
        patch: ArticlePatch,
    ) -> Result<bool, StoreError> {
        caps.require_edit("edit articles")?;
        patch.validate()?;

        let Some(article) = self.articles.iter_mut().find(|a| a.id == id) else {
            return Ok(false);
        };

        if let Some(title) = patch.title {
            article.title = title;
        }
        if let Some(description) = patch.description {
            article.description = description;
        }
        if let Some(content) = patch.content {
            article.reading_time = reading_time_minutes(&content);
            article.content = content;
        }
        if let Some(image_url) = patch.image_url {
            article.image_url = image_url;
        }
        if let Some(category) = patch.category {
            article.category = category;
        }
        if let Some(author) = patch.author {
            article.author = author;
        }
        if let Some(source) = patch.source {
            article.source = source;
        }
        if let Some(tags) = patch.tags {
            article.tags = tags;
        }
        if let Some(published_at) = patch.published_at {
            article.published_at = published_at;
        }
        if let Some(is_breaking) = patch.is_breaking {
            article.is_breaking = is_breaking;
        }
        if let Some(is_featured) = patch.is_featured {
            article.is_featured = is_featured;
        }

        self.persist_articles();
        tracing::debug!(id, "Updated article");
        Ok(true)
    }

    /// Remove an article and strip its ID from both interaction sets.
    ///
    /// Returns `Ok(false)` if no article has `id`.
    pub fn delete_article(&mut self, caps: Capabilities, id: &str) -> Result<bool, StoreError> {
        caps.require_delete("delete articles")?;

        let Some(pos) = self.articles.iter().position(|a| a.id == id) else {
            return Ok(false);
        };
        self.articles.remove(pos);
        self.persist_articles();

        if self.bookmarked.remove(id) {
            self.persist_bookmarks();
        }
        if self.liked.remove(id) {
            self.persist_likes();
        }

        tracing::debug!(id, "Deleted article");
        Ok(true)
    }

    /// `article_<unix millis>`, suffixed until it collides with no article or
    /// draft ID.
    fn next_article_id(&self) -> String {
        let base = format!("article_{}", Utc::now().timestamp_millis());
        let taken = |candidate: &str| {
            self.articles.iter().any(|a| a.id == candidate)
                || self.drafts.iter().any(|d| d.id == candidate)
        };

        if !taken(&base) {
            return base;
        }
        (1u32..)
            .map(|n| format!("{}_{}", base, n))
            .find(|candidate| !taken(candidate))
            .unwrap_or(base)
    }
}

// ============================================================================
// Tests
// ============================================================================
