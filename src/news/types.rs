use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::storage::StorageError;

// ============================================================================
// Error Types
// ============================================================================

/// Input rejected before any state changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// "All" is only meaningful as a filter.
    #[error("\"All\" is a filter, not an article category")]
    WildcardCategory,

    #[error("Unknown admin role: {0}")]
    UnknownRole(String),

    #[error("Unknown theme mode: {0}")]
    UnknownThemeMode(String),

    #[error("Unknown font size: {0}")]
    UnknownFontSize(String),
}

/// Errors surfaced by `NewsStore` operations.
///
/// Missing IDs are not errors: lookups return `Option`, mutations `Ok(false)`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Permission denied: you are not allowed to {action}")]
    PermissionDenied { action: &'static str },

    #[error("Persistence failure: {0}")]
    Persistence(#[from] StorageError),
}

// ============================================================================
// Category
// ============================================================================

/// Closed set of article categories.
///
/// The "All" wildcard is deliberately absent; see [`CategoryFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    National,
    International,
    Sports,
    #[default]
    Tech,
    Entertainment,
    Business,
    Health,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::National,
        Category::International,
        Category::Sports,
        Category::Tech,
        Category::Entertainment,
        Category::Business,
        Category::Health,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::National => "National",
            Category::International => "International",
            Category::Sports => "Sports",
            Category::Tech => "Tech",
            Category::Entertainment => "Entertainment",
            Category::Business => "Business",
            Category::Health => "Health",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive parse. "All" is rejected with `WildcardCategory`.
impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Err(ValidationError::WildcardCategory);
        }
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownCategory(trimmed.to_string()))
    }
}

/// Category selector for listing: either every article or one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => c == category,
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(category: Category) -> Self {
        CategoryFilter::Only(category)
    }
}

impl FromStr for CategoryFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Category>() {
            Ok(category) => Ok(CategoryFilter::Only(category)),
            Err(ValidationError::WildcardCategory) => Ok(CategoryFilter::All),
            Err(e) => Err(e),
        }
    }
}

// ============================================================================
// Articles
// ============================================================================

/// A published news item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub image_url: String,
    pub category: Category,
    pub author: String,
    pub source: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    /// Estimated minutes to read, derived from `content`.
    #[serde(default = "default_reading_time")]
    pub reading_time: u32,
    #[serde(default)]
    pub is_breaking: bool,
    #[serde(default)]
    pub is_featured: bool,
}

fn default_reading_time() -> u32 {
    1
}

impl Article {
    /// Ranking heuristic for "hot" content: a like weighs as much as ten views.
    pub fn trending_score(&self) -> u64 {
        self.views.saturating_add(self.likes.saturating_mul(10))
    }

    /// Unweighted engagement, used to rank recommendations.
    pub fn engagement(&self) -> u64 {
        self.views.saturating_add(self.likes)
    }

    pub fn shares_tag_with(&self, other: &Article) -> bool {
        self.tags.iter().any(|t| other.tags.contains(t))
    }
}

/// Content fields supplied when publishing an article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewArticle {
    pub title: String,
    pub description: String,
    pub content: String,
    pub image_url: String,
    pub category: Category,
    pub author: String,
    pub source: String,
    pub tags: Vec<String>,
    pub is_breaking: bool,
    pub is_featured: bool,
}

impl NewArticle {
    /// Every text field except tags must be non-blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("title", &self.title),
            ("description", &self.description),
            ("content", &self.content),
            ("imageUrl", &self.image_url),
            ("author", &self.author),
            ("source", &self.source),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField { field });
            }
        }
        Ok(())
    }
}

impl From<&Draft> for NewArticle {
    fn from(draft: &Draft) -> Self {
        Self {
            title: draft.title.clone(),
            description: draft.description.clone(),
            content: draft.content.clone(),
            image_url: draft.image_url.clone(),
            category: draft.category,
            author: draft.author.clone(),
            source: draft.source.clone(),
            tags: draft.tags.clone(),
            is_breaking: false,
            is_featured: false,
        }
    }
}

/// Partial edit of an existing article. `None` leaves a field unchanged.
///
/// Identity and counters are not editable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<Category>,
    pub author: Option<String>,
    pub source: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published_at: Option<DateTime<Utc>>,
    pub is_breaking: Option<bool>,
    pub is_featured: Option<bool>,
}

impl ArticlePatch {
    /// Provided text fields may not be blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let provided = [
            ("title", &self.title),
            ("description", &self.description),
            ("content", &self.content),
            ("imageUrl", &self.image_url),
            ("author", &self.author),
            ("source", &self.source),
        ];
        for (field, value) in provided {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(ValidationError::MissingField { field });
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == ArticlePatch::default()
    }
}

// ============================================================================
// Drafts
// ============================================================================

/// Unpublished, autosaved article-in-progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source: String,
    pub last_saved_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
}

/// Autosave payload. Only `Some` fields overwrite the stored draft.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DraftPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<Category>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
    pub source: Option<String>,
    /// `Some(None)` clears an existing schedule; JSON `null` does the same.
    #[serde(deserialize_with = "present")]
    pub scheduled_for: Option<Option<DateTime<Utc>>>,
}

/// Maps a present field, `null` included, to `Some` so it can be told apart
/// from an absent one.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ============================================================================
// Preferences
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FromStr for FontSize {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(FontSize::Small),
            "medium" => Ok(FontSize::Medium),
            "large" => Ok(FontSize::Large),
            other => Err(ValidationError::UnknownFontSize(other.to_string())),
        }
    }
}

/// Reader settings. Missing fields in a stored record fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserPreferences {
    pub preferred_categories: Vec<Category>,
    pub notifications: bool,
    pub font_size: FontSize,
    pub auto_play_videos: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            preferred_categories: vec![Category::Tech, Category::Sports, Category::Entertainment],
            notifications: true,
            font_size: FontSize::Medium,
            auto_play_videos: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencesPatch {
    pub preferred_categories: Option<Vec<Category>>,
    pub notifications: Option<bool>,
    pub font_size: Option<FontSize>,
    pub auto_play_videos: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    Auto,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::Auto => "auto",
        }
    }

    /// Resolve against the platform's colour-scheme preference.
    pub fn is_dark(self, system_prefers_dark: bool) -> bool {
        match self {
            ThemeMode::Light => false,
            ThemeMode::Dark => true,
            ThemeMode::Auto => system_prefers_dark,
        }
    }
}

impl FromStr for ThemeMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "auto" => Ok(ThemeMode::Auto),
            other => Err(ValidationError::UnknownThemeMode(other.to_string())),
        }
    }
}

// ============================================================================
// Capabilities
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    SuperAdmin,
    Editor,
    Viewer,
}

impl FromStr for AdminRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "super_admin" => Ok(AdminRole::SuperAdmin),
            "editor" => Ok(AdminRole::Editor),
            "viewer" => Ok(AdminRole::Viewer),
            other => Err(ValidationError::UnknownRole(other.to_string())),
        }
    }
}

/// Boolean gates supplied by the caller's identity layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub can_edit: bool,
    pub can_delete: bool,
}

impl Capabilities {
    pub const NONE: Capabilities = Capabilities {
        can_edit: false,
        can_delete: false,
    };
    pub const FULL: Capabilities = Capabilities {
        can_edit: true,
        can_delete: true,
    };

    pub fn for_role(role: AdminRole) -> Self {
        match role {
            AdminRole::SuperAdmin => Capabilities::FULL,
            AdminRole::Editor => Capabilities {
                can_edit: true,
                can_delete: false,
            },
            AdminRole::Viewer => Capabilities::NONE,
        }
    }

    pub(crate) fn require_edit(self, action: &'static str) -> Result<(), StoreError> {
        if self.can_edit {
            return Ok(());
        }
        tracing::warn!(action, "Edit capability missing, rejecting");
        Err(StoreError::PermissionDenied { action })
    }

    pub(crate) fn require_delete(self, action: &'static str) -> Result<(), StoreError> {
        if self.can_delete {
            return Ok(());
        }
        tracing::warn!(action, "Delete capability missing, rejecting");
        Err(StoreError::PermissionDenied { action })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_category_parse_case_insensitive() {
        assert_eq!("tech".parse::<Category>(), Ok(Category::Tech));
        assert_eq!(" Sports ".parse::<Category>(), Ok(Category::Sports));
    }

    #[test]
    fn test_category_rejects_wildcard_and_unknown() {
        assert_eq!(
            "All".parse::<Category>(),
            Err(ValidationError::WildcardCategory)
        );
        assert_eq!(
            "Weather".parse::<Category>(),
            Err(ValidationError::UnknownCategory("Weather".to_string()))
        );
    }

    #[test]
    fn test_category_filter_accepts_wildcard() {
        assert_eq!("all".parse::<CategoryFilter>(), Ok(CategoryFilter::All));
        assert_eq!(
            "Health".parse::<CategoryFilter>(),
            Ok(CategoryFilter::Only(Category::Health))
        );
        assert!("Weather".parse::<CategoryFilter>().is_err());
    }

    #[test]
    fn test_category_json_rejects_wildcard() {
        assert!(serde_json::from_str::<Category>("\"All\"").is_err());
        assert_eq!(
            serde_json::from_str::<Category>("\"Business\"").unwrap(),
            Category::Business
        );
    }

    #[test]
    fn test_new_article_validation_names_field() {
        let fields = NewArticle {
            title: "Title".into(),
            description: "Desc".into(),
            content: "Body".into(),
            image_url: "  ".into(),
            author: "A".into(),
            source: "S".into(),
            ..NewArticle::default()
        };
        assert_eq!(
            fields.validate(),
            Err(ValidationError::MissingField { field: "imageUrl" })
        );
    }

    #[test]
    fn test_patch_rejects_blank_fields_only_when_present() {
        assert!(ArticlePatch::default().validate().is_ok());
        let patch = ArticlePatch {
            author: Some(String::new()),
            ..ArticlePatch::default()
        };
        assert_eq!(
            patch.validate(),
            Err(ValidationError::MissingField { field: "author" })
        );
    }

    #[test]
    fn test_article_uses_client_json_shape() {
        let json = r#"{
            "id": "1",
            "title": "T",
            "description": "D",
            "content": "C",
            "imageUrl": "https://example.com/i.png",
            "category": "Tech",
            "author": "A",
            "source": "S",
            "publishedAt": "2024-05-01T10:00:00Z",
            "views": 3,
            "likes": 1,
            "tags": ["AI"],
            "status": "published",
            "readingTime": 2,
            "isBreaking": true,
            "isFeatured": false
        }"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.image_url, "https://example.com/i.png");
        assert_eq!(article.trending_score(), 13);
        assert!(article.is_breaking);

        let out = serde_json::to_value(&article).unwrap();
        assert!(out.get("imageUrl").is_some());
        assert!(out.get("readingTime").is_some());
    }

    #[test]
    fn test_preferences_fill_missing_fields() {
        let prefs: UserPreferences = serde_json::from_str(r#"{"fontSize":"large"}"#).unwrap();
        assert_eq!(prefs.font_size, FontSize::Large);
        assert!(prefs.notifications);
        assert!(!prefs.auto_play_videos);
        assert_eq!(prefs.preferred_categories.len(), 3);
    }

    #[test]
    fn test_role_capabilities() {
        assert_eq!(Capabilities::for_role(AdminRole::SuperAdmin), Capabilities::FULL);
        let editor = Capabilities::for_role(AdminRole::Editor);
        assert!(editor.can_edit && !editor.can_delete);
        assert_eq!(Capabilities::for_role(AdminRole::Viewer), Capabilities::NONE);
        assert_eq!("super-admin".parse::<AdminRole>(), Ok(AdminRole::SuperAdmin));
    }

    #[test]
    fn test_theme_mode_resolution() {
        assert!(ThemeMode::Dark.is_dark(false));
        assert!(!ThemeMode::Light.is_dark(true));
        assert!(ThemeMode::Auto.is_dark(true));
        assert_eq!("DARK".parse::<ThemeMode>(), Ok(ThemeMode::Dark));
    }
}
