use thiserror::Error;

// ============================================================================
// Collection Keys
// ============================================================================

/// Fixed keys for the persisted collections.
///
/// Each key holds a JSON snapshot of the whole collection. The names match the
/// layout already written by the mobile and web clients so existing data
/// hydrates without migration.
pub mod keys {
    /// Canonical article collection (JSON array).
    pub const ARTICLES: &str = "allNews";
    /// Bookmarked article IDs (JSON array of strings).
    pub const BOOKMARKS: &str = "bookmarkedNews";
    /// Liked article IDs (JSON array of strings).
    pub const LIKES: &str = "likedNews";
    /// Draft collection (JSON array).
    pub const DRAFTS: &str = "draftArticles";
    /// User preferences record (JSON object).
    pub const PREFERENCES: &str = "userPreferences";
    /// Theme mode, stored as a bare string: `light`, `dark` or `auto`.
    pub const THEME_MODE: &str = "themeMode";

    /// Every key the store hydrates from, in hydrate order.
    pub const ALL: [&str; 6] = [ARTICLES, BOOKMARKS, LIKES, DRAFTS, PREFERENCES, THEME_MODE];
}

// ============================================================================
// Error Types
// ============================================================================

/// Storage-specific errors with user-friendly messages
#[derive(Debug, Error)]
pub enum StorageError {
    /// Another instance of the application has locked the database
    #[error("Another instance of newsdesk appears to be running. Please close it and try again.")]
    InstanceLocked,

    /// Migration failed
    #[error("Storage migration failed: {0}")]
    Migration(String),

    /// Backend refused the operation (used by non-SQL adapters)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Generic database error
    #[error("Storage error: {0}")]
    Other(#[from] sqlx::Error),
}

impl StorageError {
    /// Classify a sqlx error, mapping SQLite lock conditions to `InstanceLocked`.
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if is_lock_message(&err.to_string()) {
            return StorageError::InstanceLocked;
        }
        StorageError::Other(err)
    }
}

/// SQLITE_BUSY (5), SQLITE_LOCKED (6) and SQLITE_CANTOPEN (14) all surface
/// as one of these messages.
pub(crate) fn is_lock_message(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("sqlite_busy")
        || message.contains("sqlite_locked")
        || message.contains("unable to open database file")
}

// ============================================================================
// Tests
// ============================================================================
