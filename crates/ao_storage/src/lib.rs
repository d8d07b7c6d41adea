use async_trait::async_trait;

use ao_core::{Error, Result, SourceArticle, SynthesizedArticle};

pub mod backends;

pub use backends::http::HttpRepository;
pub use backends::memory::MemoryRepository;

/// Access to the external content repository that owns the articles this
/// pipeline rewrites.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<SourceArticle>>;

    async fn fetch_by_id(&self, id: u64) -> Result<SourceArticle>;

    async fn update(&self, id: u64, article: &SynthesizedArticle) -> Result<SourceArticle>;

    /// The article with the highest id. Ids are unique, so the order is
    /// total and ties are impossible.
    async fn fetch_latest(&self) -> Result<SourceArticle> {
        self.fetch_all()
            .await?
            .into_iter()
            .max_by_key(|article| article.id)
            .ok_or_else(|| Error::Repository("no articles found in the repository".to_string()))
    }
}

pub mod prelude {
    pub use super::{ArticleRepository, HttpRepository, MemoryRepository};
    pub use ao_core::{Result, SourceArticle, SynthesizedArticle};
}
