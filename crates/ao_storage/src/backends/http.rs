use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use ao_core::config::RepositoryConfig;
use ao_core::{Error, Result, SourceArticle, SynthesizedArticle};

use crate::ArticleRepository;

/// Every repository response is wrapped in this envelope; a falsy status or
/// missing data is an invalid response, whatever the HTTP code said.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    status: bool,
    data: Option<T>,
}

/// The list endpoint pages its records one level deeper.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Paginated<T> {
    #[serde(default)]
    data: Vec<T>,
}

pub struct HttpRepository {
    client: Client,
    base_url: String,
}

impl HttpRepository {
    pub fn new(config: &RepositoryConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn unwrap_data<T>(envelope: Envelope<T>, context: &str) -> Result<T> {
        if !envelope.status {
            return Err(Error::InvalidResponse(format!(
                "{}: API reported failure",
                context
            )));
        }
        envelope
            .data
            .ok_or_else(|| Error::InvalidResponse(format!("{}: missing data field", context)))
    }
}

#[async_trait]
impl ArticleRepository for HttpRepository {
    async fn fetch_all(&self) -> Result<Vec<SourceArticle>> {
        let url = format!("{}/articles", self.base_url);
        let envelope: Envelope<Paginated<SourceArticle>> = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let page = Self::unwrap_data(envelope, "listing articles")?;
        info!("📚 Fetched {} article(s) from the repository", page.data.len());
        Ok(page.data)
    }

    async fn fetch_by_id(&self, id: u64) -> Result<SourceArticle> {
        let url = format!("{}/articles/{}", self.base_url, id);
        let envelope: Envelope<SourceArticle> = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Self::unwrap_data(envelope, &format!("fetching article {}", id))
    }

    async fn update(&self, id: u64, article: &SynthesizedArticle) -> Result<SourceArticle> {
        let url = format!("{}/articles/{}", self.base_url, id);
        let envelope: Envelope<SourceArticle> = self
            .client
            .put(&url)
            .header("Accept", "application/json")
            .json(article)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !envelope.status {
            return Err(Error::Repository(format!("failed to update article {}", id)));
        }
        let updated = envelope
            .data
            .ok_or_else(|| Error::Repository(format!("update of article {} returned no record", id)))?;

        info!("📤 Published optimized article {}", id);
        Ok(updated)
    }
}
