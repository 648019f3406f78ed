use chrono::{Duration, Utc};

use super::types::{Article, Category};
use crate::util::reading_time_minutes;

/// Sample articles used when nothing has been persisted yet.
pub fn demo_articles() -> Vec<Article> {
    let now = Utc::now();

    let space = "In a groundbreaking discovery that has sent shockwaves through the \
                 scientific community, researchers using the James Webb Space Telescope \
                 have observed a cosmic phenomenon that fundamentally challenges our \
                 understanding of physics.";
    let reasoning = "Researchers have developed an AI system that demonstrates \
                     human-level reasoning across multiple domains.";

    vec![
        Article {
            id: "1".to_string(),
            title: "Breaking: Major Scientific Discovery Changes Everything We Know About Space"
                .to_string(),
            description: "Astronomers detect unprecedented cosmic phenomenon that challenges \
                          existing physics theories"
                .to_string(),
            content: space.to_string(),
            image_url: "https://images.unsplash.com/photo-1446776653964-20c1d3a81b06?w=800"
                .to_string(),
            category: Category::Tech,
            author: "Dr. Elena Rodriguez".to_string(),
            source: "Science Daily".to_string(),
            tags: vec!["Space".into(), "Science".into(), "Discovery".into()],
            published_at: now,
            views: 25_420,
            likes: 1_845,
            reading_time: reading_time_minutes(space),
            is_breaking: true,
            is_featured: true,
        },
        Article {
            id: "2".to_string(),
            title: "AI Revolution: New Model Achieves Human-Level Reasoning".to_string(),
            description: "Breakthrough artificial intelligence system demonstrates \
                          unprecedented problem-solving capabilities"
                .to_string(),
            content: reasoning.to_string(),
            image_url: "https://images.unsplash.com/photo-1677442136019-21780ecad995?w=800"
                .to_string(),
            category: Category::Tech,
            author: "Sarah Johnson".to_string(),
            source: "Tech Review".to_string(),
            tags: vec!["AI".into(), "Technology".into(), "Innovation".into()],
            published_at: now - Duration::hours(2),
            views: 18_700,
            likes: 1_250,
            reading_time: reading_time_minutes(reasoning),
            is_breaking: false,
            is_featured: true,
        },
    ]
}
