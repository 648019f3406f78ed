use super::types::{PreferencesPatch, ThemeMode, UserPreferences};
use super::NewsStore;

impl NewsStore {
    // ========================================================================
    // User Preferences Operations
    // ========================================================================

    /// Always a complete record; fields never written hold their defaults.
    pub fn preferences(&self) -> &UserPreferences {
        &self.preferences
    }

    /// Shallow-merge `patch` and persist. Last write wins.
    ///
    /// Preferred categories are de-duplicated, keeping first occurrences.
    pub fn update_preferences(&mut self, patch: PreferencesPatch) -> &UserPreferences {
        if let Some(mut categories) = patch.preferred_categories {
            let mut seen = Vec::with_capacity(categories.len());
            categories.retain(|c| {
                if seen.contains(c) {
                    false
                } else {
                    seen.push(*c);
                    true
                }
            });
            self.preferences.preferred_categories = categories;
        }
        if let Some(notifications) = patch.notifications {
            self.preferences.notifications = notifications;
        }
        if let Some(font_size) = patch.font_size {
            self.preferences.font_size = font_size;
        }
        if let Some(auto_play_videos) = patch.auto_play_videos {
            self.preferences.auto_play_videos = auto_play_videos;
        }

        self.persist_preferences();
        &self.preferences
    }

    pub fn theme_mode(&self) -> ThemeMode {
        self.theme_mode
    }

    pub fn set_theme_mode(&mut self, mode: ThemeMode) {
        self.theme_mode = mode;
        self.persist_theme_mode();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use crate::news::tests::empty_store;
    use crate::news::{Category, FontSize, PreferencesPatch, ThemeMode, UserPreferences};
    use crate::storage::keys;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_defaults() {
        let (store, _) = empty_store().await;
        let prefs = store.preferences();
        assert_eq!(
            prefs.preferred_categories,
            vec![Category::Tech, Category::Sports, Category::Entertainment]
        );
        assert!(prefs.notifications);
        assert_eq!(prefs.font_size, FontSize::Medium);
        assert!(!prefs.auto_play_videos);
    }

    #[tokio::test]
    async fn test_update_is_shallow_merge() {
        let (mut store, adapter) = empty_store().await;
        store.update_preferences(PreferencesPatch {
            font_size: Some(FontSize::Large),
            ..PreferencesPatch::default()
        });
        let prefs = store
            .update_preferences(PreferencesPatch {
                notifications: Some(false),
                ..PreferencesPatch::default()
            })
            .clone();

        assert_eq!(prefs.font_size, FontSize::Large);
        assert!(!prefs.notifications);
        assert_eq!(prefs.preferred_categories.len(), 3);

        store.flush().await;
        let stored: UserPreferences =
            serde_json::from_str(&adapter.raw(keys::PREFERENCES).await.unwrap()).unwrap();
        assert_eq!(stored, prefs);
    }

    #[tokio::test]
    async fn test_preferred_categories_deduplicated() {
        let (mut store, _) = empty_store().await;
        let prefs = store.update_preferences(PreferencesPatch {
            preferred_categories: Some(vec![Category::Health, Category::Tech, Category::Health]),
            ..PreferencesPatch::default()
        });
        assert_eq!(
            prefs.preferred_categories,
            vec![Category::Health, Category::Tech]
        );
    }

    #[tokio::test]
    async fn test_theme_mode_stored_as_bare_string() {
        let (mut store, adapter) = empty_store().await;
        store.set_theme_mode(ThemeMode::Light);
        store.flush().await;

        assert_eq!(store.theme_mode(), ThemeMode::Light);
        assert_eq!(adapter.raw(keys::THEME_MODE).await, Some("light".to_string()));
    }
}
