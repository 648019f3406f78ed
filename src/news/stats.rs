use std::cmp::Reverse;

use super::types::Category;
use super::NewsStore;

/// Number of entries in [`NewsStats::most_viewed`].
const MOST_VIEWED_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryViews {
    pub category: Category,
    pub articles: usize,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopArticle {
    pub id: String,
    pub title: String,
    pub views: u64,
}

/// Aggregate engagement figures for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsStats {
    pub total_articles: usize,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_drafts: usize,
    /// Only categories with at least one article, in `Category::ALL` order.
    pub views_by_category: Vec<CategoryViews>,
    pub most_viewed: Vec<TopArticle>,
}

impl NewsStore {
    pub fn stats(&self) -> NewsStats {
        let views_by_category = Category::ALL
            .into_iter()
            .filter_map(|category| {
                let (articles, views) = self
                    .articles
                    .iter()
                    .filter(|a| a.category == category)
                    .fold((0usize, 0u64), |(n, v), a| (n + 1, v.saturating_add(a.views)));
                (articles > 0).then_some(CategoryViews {
                    category,
                    articles,
                    views,
                })
            })
            .collect();

        let mut by_views: Vec<_> = self.articles.iter().collect();
        by_views.sort_by_key(|a| Reverse(a.views));
        let most_viewed = by_views
            .into_iter()
            .take(MOST_VIEWED_LIMIT)
            .map(|a| TopArticle {
                id: a.id.clone(),
                title: a.title.clone(),
                views: a.views,
            })
            .collect();

        NewsStats {
            total_articles: self.articles.len(),
            total_views: self
                .articles
                .iter()
                .fold(0u64, |total, a| total.saturating_add(a.views)),
            total_likes: self
                .articles
                .iter()
                .fold(0u64, |total, a| total.saturating_add(a.likes)),
            total_drafts: self.drafts.len(),
            views_by_category,
            most_viewed,
        }
    }
}
