use std::time::Duration;

use tokio::time::sleep;
use tracing::info;

use ao_core::{Error, Result, ScrapedDocument, SearchCandidate};

use crate::page::PageContentExtractor;
use crate::search::SearchResultExtractor;

/// Biases the provider toward long-form writeups instead of product and
/// landing pages.
const QUERY_QUALIFIER: &str = "blog article guide";

/// Composes search and page extraction into "find candidate articles for a
/// topic" and "fetch and validate these URLs".
pub struct ContentAcquisitionService {
    search: SearchResultExtractor,
    pages: PageContentExtractor,
    scrape_delay: Duration,
}

impl ContentAcquisitionService {
    pub fn new(
        search: SearchResultExtractor,
        pages: PageContentExtractor,
        scrape_delay: Duration,
    ) -> Self {
        Self {
            search,
            pages,
            scrape_delay,
        }
    }

    /// Search for reference candidates on a topic. Coming back with fewer
    /// than requested is fine; coming back with nothing is fatal to the
    /// caller's run.
    pub async fn find_references(
        &self,
        topic: &str,
        max_references: usize,
    ) -> Result<Vec<SearchCandidate>> {
        let query = format!("{} {}", topic, QUERY_QUALIFIER);
        let candidates = self.search.search(&query, max_references).await?;

        if candidates.is_empty() {
            return Err(Error::NoCandidates(format!(
                "cannot optimize \"{}\" without reference material",
                topic
            )));
        }

        info!("🔗 {} candidate(s) for \"{}\"", candidates.len(), topic);
        Ok(candidates)
    }

    /// Fetch every URL in order, pacing between requests to stay polite to
    /// the origins. Failed documents come back alongside usable ones so the
    /// caller can account for partial failures.
    pub async fn fetch_and_validate(&self, urls: &[String]) -> Result<Vec<ScrapedDocument>> {
        let mut documents = Vec::with_capacity(urls.len());

        for (i, url) in urls.iter().enumerate() {
            info!("🌐 [{}/{}] Scraping {}", i + 1, urls.len(), url);
            documents.push(self.pages.extract(url).await?);

            if i + 1 < urls.len() {
                sleep(self.scrape_delay).await;
            }
        }

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::ExtractionStrategy;
    use crate::search::SearchStrategy;
    use ao_core::ScrapeMethod;
    use async_trait::async_trait;

    struct EmptySearch;

    #[async_trait]
    impl SearchStrategy for EmptySearch {
        fn name(&self) -> &str {
            "empty"
        }

        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<SearchCandidate>> {
            Ok(Vec::new())
        }

        fn is_satisfied(&self, _found: usize, _limit: usize) -> bool {
            true
        }
    }

    struct OneHit;

    #[async_trait]
    impl SearchStrategy for OneHit {
        fn name(&self) -> &str {
            "one"
        }

        async fn search(&self, query: &str, _limit: usize) -> Result<Vec<SearchCandidate>> {
            assert!(query.ends_with("blog article guide"));
            Ok(vec![SearchCandidate {
                url: "https://a.test/ref".to_string(),
                title: "Ref".to_string(),
                snippet: String::new(),
            }])
        }

        fn is_satisfied(&self, found: usize, _limit: usize) -> bool {
            found > 0
        }
    }

    struct MixedPages;

    #[async_trait]
    impl ExtractionStrategy for MixedPages {
        fn name(&self) -> &str {
            "mixed"
        }

        async fn extract(&self, url: &str) -> Result<ScrapedDocument> {
            if url.contains("bad") {
                Err(Error::Scraping("403".to_string()))
            } else {
                Ok(ScrapedDocument::new(
                    url,
                    "t".to_string(),
                    "x".repeat(300),
                    ScrapeMethod::Fast,
                ))
            }
        }
    }

    fn service(search: Box<dyn SearchStrategy>) -> ContentAcquisitionService {
        ContentAcquisitionService::new(
            SearchResultExtractor::with_strategies(vec![search]),
            PageContentExtractor::with_strategies(vec![Box::new(MixedPages)]),
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn test_zero_candidates_is_fatal() {
        let acquisition = service(Box::new(EmptySearch));
        let result = acquisition.find_references("some topic", 2).await;
        assert!(matches!(result, Err(Error::NoCandidates(_))));
        assert!(result
            .unwrap_err()
            .to_string()
            .starts_with("No search results"));
    }

    #[tokio::test]
    async fn test_fewer_than_requested_is_fine() {
        let acquisition = service(Box::new(OneHit));
        let candidates = acquisition.find_references("some topic", 3).await.unwrap();
        assert_eq!(candidates.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_and_validate_keeps_failed_documents() {
        let acquisition = service(Box::new(OneHit));
        let urls = vec![
            "https://a.test/good".to_string(),
            "https://a.test/bad".to_string(),
            "https://a.test/also-good".to_string(),
        ];
        let documents = acquisition.fetch_and_validate(&urls).await.unwrap();
        assert_eq!(documents.len(), 3);
        assert!(documents[0].is_usable());
        assert_eq!(documents[1].method, ScrapeMethod::Failed);
        assert!(documents[2].is_usable());
    }
}
