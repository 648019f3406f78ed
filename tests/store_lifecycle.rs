//! End-to-end tests for the news store: interactions, ranking, drafts,
//! cascading deletes and persistence across sessions.
//!
//! Each test builds its own adapter, either a `MemoryStore` or an in-memory
//! SQLite database, so tests stay isolated.

use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

use newsdesk::news::{
    AdminRole, Capabilities, Category, DraftPatch, NewArticle, NewsStore, StoreError, StoreOptions,
    ThemeMode,
};
use newsdesk::storage::{keys, KeyValueStore, MemoryStore, SqliteStore};

fn no_seed() -> StoreOptions {
    StoreOptions {
        seed_demo_content: false,
    }
}

async fn open_memory() -> (NewsStore, Arc<MemoryStore>) {
    let adapter = Arc::new(MemoryStore::new());
    let store = NewsStore::open(adapter.clone(), no_seed()).await.unwrap();
    (store, adapter)
}

fn article_fields(title: &str, category: Category) -> NewArticle {
    NewArticle {
        title: title.to_string(),
        description: format!("About {}", title),
        content: "Short body for the test article".to_string(),
        image_url: "https://example.com/cover.jpg".to_string(),
        category,
        author: "Desk".to_string(),
        source: "Wire".to_string(),
        tags: vec!["news".to_string()],
        is_breaking: false,
        is_featured: false,
    }
}

/// Stored article record in the persisted camelCase layout.
fn stored_article(id: &str, category: &str, views: u64, likes: u64) -> serde_json::Value {
    json!({
        "id": id,
        "title": format!("Story {}", id),
        "description": "desc",
        "content": "body",
        "imageUrl": "https://example.com/a.jpg",
        "category": category,
        "author": "Reporter",
        "source": "Wire",
        "tags": [],
        "publishedAt": "2024-05-01T08:00:00Z",
        "views": views,
        "likes": likes,
        "readingTime": 1
    })
}

// ============================================================================
// Interaction Scenarios
// ============================================================================

#[tokio::test]
async fn test_like_toggles_counter_and_membership() {
    let (mut store, adapter) = open_memory().await;
    let article = store
        .create_article(Capabilities::FULL, article_fields("X", Category::Tech), None)
        .unwrap();
    assert_eq!((article.views, article.likes), (0, 0));

    assert_eq!(store.toggle_like(&article.id), Some(true));
    assert_eq!(store.article(&article.id).unwrap().likes, 1);
    assert!(store.is_liked(&article.id));

    assert_eq!(store.toggle_like(&article.id), Some(false));
    assert_eq!(store.article(&article.id).unwrap().likes, 0);
    assert!(!store.is_liked(&article.id));

    store.flush().await;
    assert_eq!(adapter.raw(keys::LIKES).await, Some("[]".to_string()));
}

#[tokio::test]
async fn test_trending_prefers_weighted_likes() {
    let articles = json!([
        stored_article("tech", "Tech", 100, 5),
        stored_article("sports", "Sports", 200, 1),
    ]);
    let adapter = Arc::new(MemoryStore::with_entries([(
        keys::ARTICLES,
        articles.to_string(),
    )]));
    let store = NewsStore::open(adapter, no_seed()).await.unwrap();

    let trending = store.trending(15);
    let ranked: Vec<(&str, u64)> = trending
        .iter()
        .map(|a| (a.id.as_str(), a.trending_score()))
        .collect();
    assert_eq!(ranked, vec![("sports", 210), ("tech", 150)]);
}

#[tokio::test]
async fn test_draft_promotion_retires_draft() {
    let (mut store, adapter) = open_memory().await;

    store
        .save_draft(
            "D1",
            DraftPatch {
                title: Some("Draft A".to_string()),
                description: Some("Lead".to_string()),
                content: Some("Body of the draft".to_string()),
                image_url: Some("https://example.com/d.jpg".to_string()),
                author: Some("Editor".to_string()),
                source: Some("Desk".to_string()),
                ..DraftPatch::default()
            },
        )
        .unwrap();
    store
        .save_draft(
            "D1",
            DraftPatch {
                title: Some("Draft A revised".to_string()),
                ..DraftPatch::default()
            },
        )
        .unwrap();

    let fields = NewArticle::from(store.draft("D1").unwrap());
    let article = store
        .create_article(Capabilities::FULL, fields, Some("D1"))
        .unwrap();

    assert!(store.draft("D1").is_none());
    assert_eq!(article.title, "Draft A revised");
    assert_eq!(store.articles()[0].id, article.id);

    store.flush().await;
    let log = adapter.write_log().await;
    let articles_at = log.iter().rposition(|k| k == keys::ARTICLES).unwrap();
    let drafts_at = log.iter().rposition(|k| k == keys::DRAFTS).unwrap();
    assert!(articles_at < drafts_at, "articles must be persisted before drafts: {:?}", log);
    assert_eq!(adapter.raw(keys::DRAFTS).await, Some("[]".to_string()));
}

#[tokio::test]
async fn test_delete_clears_bookmark_and_like() {
    let (mut store, adapter) = open_memory().await;
    let article = store
        .create_article(Capabilities::FULL, article_fields("Gone", Category::International), None)
        .unwrap();
    store.toggle_bookmark(&article.id);
    store.toggle_like(&article.id);

    assert!(store.delete_article(Capabilities::FULL, &article.id).unwrap());

    assert!(!store.is_bookmarked(&article.id));
    assert!(!store.is_liked(&article.id));
    assert!(store.bookmarked_articles().is_empty());

    store.flush().await;
    assert_eq!(adapter.raw(keys::BOOKMARKS).await, Some("[]".to_string()));
    assert_eq!(adapter.raw(keys::LIKES).await, Some("[]".to_string()));
}

// ============================================================================
// Capability Gate
// ============================================================================

#[tokio::test]
async fn test_roles_gate_mutations() {
    let (mut store, _) = open_memory().await;
    let viewer = Capabilities::for_role(AdminRole::Viewer);
    let editor = Capabilities::for_role(AdminRole::Editor);

    let denied = store.create_article(viewer, article_fields("Nope", Category::Tech), None);
    assert!(matches!(denied, Err(StoreError::PermissionDenied { .. })));
    assert!(store.articles().is_empty());

    let article = store
        .create_article(editor, article_fields("Yes", Category::Tech), None)
        .unwrap();
    let denied = store.delete_article(editor, &article.id);
    assert!(matches!(denied, Err(StoreError::PermissionDenied { .. })));
    assert_eq!(store.articles().len(), 1);
}

// ============================================================================
// Persistence Across Sessions
// ============================================================================

#[tokio::test]
async fn test_sqlite_round_trip_across_sessions() {
    let sqlite = SqliteStore::open(":memory:").await.unwrap();
    let adapter: Arc<dyn KeyValueStore> = Arc::new(sqlite);

    let id = {
        let mut store = NewsStore::open(adapter.clone(), StoreOptions::default())
            .await
            .unwrap();
        assert_eq!(store.articles().len(), 2);

        let article = store
            .create_article(Capabilities::FULL, article_fields("Persisted", Category::Business), None)
            .unwrap();
        store.toggle_bookmark(&article.id);
        store.increment_views(&article.id);
        store.set_theme_mode(ThemeMode::Dark);
        store.flush().await;
        assert!(store.persistence_status().is_healthy());
        article.id
    };

    let reopened = NewsStore::open(adapter.clone(), StoreOptions::default())
        .await
        .unwrap();
    assert_eq!(reopened.articles().len(), 3);
    assert_eq!(reopened.articles()[0].id, id);
    assert_eq!(reopened.article(&id).unwrap().views, 1);
    assert!(reopened.is_bookmarked(&id));
    assert_eq!(reopened.theme_mode(), ThemeMode::Dark);
    assert_eq!(
        adapter.get(keys::THEME_MODE).await.unwrap(),
        Some("dark".to_string())
    );
}

#[tokio::test]
async fn test_failed_writes_do_not_roll_back() {
    let (mut store, adapter) = open_memory().await;
    let article = store
        .create_article(Capabilities::FULL, article_fields("Kept", Category::Health), None)
        .unwrap();
    store.flush().await;

    adapter.set_fail_writes(true);
    assert_eq!(store.toggle_bookmark(&article.id), Some(true));
    store.flush().await;

    assert!(store.is_bookmarked(&article.id));
    let status = store.persistence_status();
    assert_eq!(status.failures, 1);
    assert!(status.last_error.is_some());
    assert_eq!(adapter.raw(keys::BOOKMARKS).await, None);
}

#[tokio::test]
async fn test_unreadable_mirror_refuses_to_open() {
    let adapter = Arc::new(MemoryStore::new());
    adapter.set_fail_reads(true);

    let result = NewsStore::open(adapter, StoreOptions::default()).await;
    assert!(matches!(result, Err(StoreError::Persistence(_))));
}
