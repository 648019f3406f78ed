//! Integration tests for provider ingestion: candidates arrive as JSON in the
//! provider shape and are published through the capability gate.

use pretty_assertions::assert_eq;
use std::sync::Arc;

use newsdesk::news::{
    AdminRole, CandidateArticle, Capabilities, Category, IngestReport, NewsStore, StoreError,
    StoreOptions,
};
use newsdesk::storage::{keys, MemoryStore, SqliteStore};

const PROVIDER_BATCH: &str = r#"[
    {
        "title": "Rates held steady",
        "description": "Central bank pauses",
        "content": "The central bank kept rates unchanged on Thursday.",
        "imageUrl": "https://example.com/rates.jpg",
        "category": "business",
        "author": "Markets Desk",
        "tags": ["economy", "rates"],
        "source": "Wire",
        "isBreaking": true
    },
    {
        "title": "RATES HELD STEADY",
        "description": "Same story, louder",
        "content": "Duplicate.",
        "imageUrl": "https://example.com/dup.jpg",
        "category": "Business",
        "author": "Copy Desk",
        "source": "Wire"
    },
    {
        "title": "Moon base opens",
        "description": "First crew arrives",
        "content": "The crew landed safely.",
        "imageUrl": "https://example.com/moon.jpg",
        "category": "Space",
        "author": "Science Desk",
        "source": "Wire"
    },
    {
        "title": "Untitled wire item",
        "category": "Tech"
    }
]"#;

fn batch() -> Vec<CandidateArticle> {
    serde_json::from_str(PROVIDER_BATCH).unwrap()
}

#[tokio::test]
async fn test_ingest_counts_each_outcome() {
    let adapter = Arc::new(MemoryStore::new());
    let mut store = NewsStore::open(adapter.clone(), StoreOptions::default())
        .await
        .unwrap();

    let report = store.ingest(Capabilities::FULL, batch()).unwrap();

    assert_eq!(
        report,
        IngestReport {
            added: 1,
            skipped: 1,
            rejected: 2,
        }
    );
    let newest = &store.articles()[0];
    assert_eq!(newest.title, "Rates held steady");
    assert_eq!(newest.category, Category::Business);
    assert!(newest.is_breaking);
    assert_eq!(store.breaking_news(5)[0].id, newest.id);
    assert_eq!(store.articles().len(), 3);

    store.flush().await;
    let persisted = adapter.raw(keys::ARTICLES).await.unwrap();
    assert!(persisted.contains("Rates held steady"));
}

#[tokio::test]
async fn test_ingest_twice_is_idempotent() {
    let sqlite = SqliteStore::open(":memory:").await.unwrap();
    let mut store = NewsStore::open(Arc::new(sqlite), StoreOptions::default())
        .await
        .unwrap();

    let first = store.ingest(Capabilities::FULL, batch()).unwrap();
    let second = store.ingest(Capabilities::FULL, batch()).unwrap();

    assert_eq!(first.added, 1);
    assert_eq!(second.added, 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(store.search("rates held").len(), 1);
}

#[tokio::test]
async fn test_viewer_cannot_ingest() {
    let adapter = Arc::new(MemoryStore::new());
    let mut store = NewsStore::open(adapter, StoreOptions::default())
        .await
        .unwrap();
    let before = store.articles().len();

    let result = store.ingest(Capabilities::for_role(AdminRole::Viewer), batch());

    assert!(matches!(result, Err(StoreError::PermissionDenied { .. })));
    assert_eq!(store.articles().len(), before);
}
