use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use ao_core::{Error, Result, SourceArticle, SynthesizedArticle};

use crate::ArticleRepository;

/// In-memory repository used by tests and local dry runs. Records every
/// update it receives so callers can inspect what would have been published.
#[derive(Default, Clone)]
pub struct MemoryRepository {
    articles: Arc<RwLock<Vec<SourceArticle>>>,
    updates: Arc<RwLock<Vec<(u64, SynthesizedArticle)>>>,
}

impl MemoryRepository {
    pub fn new(articles: Vec<SourceArticle>) -> Self {
        Self {
            articles: Arc::new(RwLock::new(articles)),
            updates: Arc::default(),
        }
    }

    /// Updates received so far, oldest first.
    pub async fn updates(&self) -> Vec<(u64, SynthesizedArticle)> {
        self.updates.read().await.clone()
    }
}

#[async_trait]
impl ArticleRepository for MemoryRepository {
    async fn fetch_all(&self) -> Result<Vec<SourceArticle>> {
        Ok(self.articles.read().await.clone())
    }

    async fn fetch_by_id(&self, id: u64) -> Result<SourceArticle> {
        self.articles
            .read()
            .await
            .iter()
            .find(|article| article.id == id)
            .cloned()
            .ok_or_else(|| Error::Repository(format!("article {} not found", id)))
    }

    async fn update(&self, id: u64, article: &SynthesizedArticle) -> Result<SourceArticle> {
        let mut articles = self.articles.write().await;
        let existing = articles
            .iter_mut()
            .find(|existing| existing.id == id)
            .ok_or_else(|| Error::Repository(format!("article {} not found", id)))?;

        existing.title = article.title.clone();
        existing.content = article.content.clone();
        existing.author = article.author.as_str().to_string();
        existing.updated_at = Some(chrono::Utc::now());
        let updated = existing.clone();
        drop(articles);

        self.updates.write().await.push((id, article.clone()));
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ao_core::{Provenance, ReferenceArticle};

    fn article(id: u64, title: &str) -> SourceArticle {
        SourceArticle {
            id,
            title: title.to_string(),
            url: format!("https://x.test/{}", id),
            content: "content".to_string(),
            author: "author".to_string(),
            updated_at: None,
        }
    }

    fn synthesized(title: &str) -> SynthesizedArticle {
        SynthesizedArticle {
            title: title.to_string(),
            content: "<p>new</p>".to_string(),
            author: Provenance::AiOptimizer,
            url: "https://x.test/1".to_string(),
            reference_articles: vec![ReferenceArticle {
                title: "Ref".to_string(),
                url: "https://r.test".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_fetch_latest_is_highest_id() {
        let repository = MemoryRepository::new(vec![article(3, "c"), article(9, "i"), article(5, "e")]);
        let latest = repository.fetch_latest().await.unwrap();
        assert_eq!(latest.id, 9);
    }

    #[tokio::test]
    async fn test_fetch_latest_on_empty_repository_errors() {
        let repository = MemoryRepository::new(Vec::new());
        assert!(repository.fetch_latest().await.is_err());
    }

    #[tokio::test]
    async fn test_update_records_publication() {
        let repository = MemoryRepository::new(vec![article(1, "old")]);
        repository.update(1, &synthesized("new")).await.unwrap();

        let stored = repository.fetch_by_id(1).await.unwrap();
        assert_eq!(stored.title, "new");
        assert_eq!(stored.author, "AI Optimizer");
        assert!(stored.updated_at.is_some());

        let updates = repository.updates().await;
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, 1);
    }

    #[tokio::test]
    async fn test_update_unknown_id_errors() {
        let repository = MemoryRepository::new(vec![article(1, "old")]);
        assert!(repository.update(42, &synthesized("new")).await.is_err());
    }
}
