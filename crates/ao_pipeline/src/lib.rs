use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};

use ao_core::config::Config;
use ao_core::{Error, OptimizationResult, Result, ScrapedDocument, SourceArticle};
use ao_inference::models::create_model;
use ao_inference::ArticleSynthesizer;
use ao_scrapers::{ContentAcquisitionService, PageContentExtractor, SearchResultExtractor};
use ao_storage::{ArticleRepository, HttpRepository};

/// Drives one article through fetch → search → scrape → synthesize →
/// publish, and batches of articles through the same machine with per-item
/// isolation.
pub struct OptimizationOrchestrator {
    repository: Arc<dyn ArticleRepository>,
    acquisition: ContentAcquisitionService,
    synthesizer: ArticleSynthesizer,
    max_references: usize,
    batch_delay: Duration,
}

impl OptimizationOrchestrator {
    pub fn new(
        repository: Arc<dyn ArticleRepository>,
        acquisition: ContentAcquisitionService,
        synthesizer: ArticleSynthesizer,
        max_references: usize,
        batch_delay: Duration,
    ) -> Self {
        Self {
            repository,
            acquisition,
            synthesizer,
            max_references,
            batch_delay,
        }
    }

    /// Wire the production stack from one configuration.
    pub fn from_config(config: &Config) -> Self {
        let repository = Arc::new(HttpRepository::new(&config.repository));
        let acquisition = ContentAcquisitionService::new(
            SearchResultExtractor::new(&config.search, &config.scraping),
            PageContentExtractor::new(&config.scraping),
            config.scraping.scrape_delay,
        );
        let synthesizer = ArticleSynthesizer::new(create_model(&config.generation));

        Self::new(
            repository,
            acquisition,
            synthesizer,
            config.search.results_to_fetch,
            config.scraping.batch_delay,
        )
    }

    /// Optimize one article: the given id, or the highest-id article when
    /// none is given. Aborts (no candidates, nothing usable scraped) and
    /// publish failures surface as `Err`; the batch harness is the layer
    /// that converts them into failed results.
    pub async fn run_one(&self, article_id: Option<u64>) -> Result<OptimizationResult> {
        let article = match article_id {
            Some(id) => self.repository.fetch_by_id(id).await?,
            None => self.repository.fetch_latest().await?,
        };
        info!("📰 Optimizing article {} (\"{}\")", article.id, article.title);
        self.optimize(&article).await
    }

    async fn optimize(&self, article: &SourceArticle) -> Result<OptimizationResult> {
        let candidates = self
            .acquisition
            .find_references(&article.title, self.max_references)
            .await?;

        let urls: Vec<String> = candidates.iter().map(|c| c.url.clone()).collect();
        let documents = self.acquisition.fetch_and_validate(&urls).await?;
        let usable: Vec<ScrapedDocument> = documents
            .into_iter()
            .filter(ScrapedDocument::is_usable)
            .collect();
        if usable.is_empty() {
            return Err(Error::NoUsableContent(format!(
                "no reference page for article {} survived scraping",
                article.id
            )));
        }
        info!("📑 {} usable reference document(s)", usable.len());

        let synthesized = match self.synthesizer.synthesize(article, &usable).await {
            Ok(synthesized) => synthesized,
            Err(e) => {
                warn!(
                    "Synthesis failed for article {} ({}), keeping original content",
                    article.id, e
                );
                ArticleSynthesizer::original_content_fallback(article)
            }
        };

        self.repository.update(article.id, &synthesized).await?;
        info!(
            "✅ Article {} optimized ({} chars, provenance: {})",
            article.id,
            synthesized.content.len(),
            synthesized.author
        );

        Ok(OptimizationResult::completed(article, &usable, &synthesized))
    }

    /// Batch variant: the supplied ids in order, or every known id
    /// ascending. Each article's failure is caught and recorded; one bad
    /// article never prevents the rest from being attempted.
    pub async fn run_batch(
        &self,
        article_ids: Option<Vec<u64>>,
    ) -> Result<Vec<OptimizationResult>> {
        let ids = match article_ids {
            Some(ids) if !ids.is_empty() => ids,
            _ => {
                let mut ids: Vec<u64> = self
                    .repository
                    .fetch_all()
                    .await?
                    .iter()
                    .map(|article| article.id)
                    .collect();
                ids.sort_unstable();
                ids
            }
        };
        info!("📦 Optimizing {} article(s)", ids.len());

        let mut results = Vec::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            info!("Processing article {}/{} (id {})", i + 1, ids.len(), id);
            match self.run_one(Some(*id)).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!("💥 Optimization of article {} failed: {}", id, e);
                    results.push(OptimizationResult::failed(*id, e.to_string()));
                }
            }

            if i + 1 < ids.len() {
                sleep(self.batch_delay).await;
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ao_core::{Provenance, ScrapeMethod, SearchCandidate};
    use ao_inference::models::GenerationModel;
    use ao_scrapers::page::ExtractionStrategy;
    use ao_scrapers::search::SearchStrategy;
    use ao_storage::MemoryRepository;

    /// Derives candidate URLs from the query so page fixtures can key off
    /// the article that triggered the search.
    struct SluggedSearch {
        results_per_query: usize,
    }

    #[async_trait]
    impl SearchStrategy for SluggedSearch {
        fn name(&self) -> &str {
            "fixture"
        }

        async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchCandidate>> {
            let slug = query
                .split_whitespace()
                .next()
                .unwrap_or("topic")
                .to_lowercase();
            Ok((0..self.results_per_query.min(limit))
                .map(|i| SearchCandidate {
                    url: format!("https://refs.test/{}/{}", slug, i),
                    title: format!("Reference {}", i),
                    snippet: String::new(),
                })
                .collect())
        }

        fn is_satisfied(&self, found: usize, _limit: usize) -> bool {
            found > 0
        }
    }

    struct NoResultsSearch;

    #[async_trait]
    impl SearchStrategy for NoResultsSearch {
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

    /// Succeeds with long content except for URLs derived from a "broken"
    /// article title, which fail scraping outright.
    struct KeyedPages;

    #[async_trait]
    impl ExtractionStrategy for KeyedPages {
        fn name(&self) -> &str {
            "keyed"
        }

        async fn extract(&self, url: &str) -> Result<ScrapedDocument> {
            if url.contains("broken") {
                return Err(Error::Scraping("origin refused the connection".to_string()));
            }
            Ok(ScrapedDocument::new(
                url,
                format!("Scraped {}", url),
                "reference body ".repeat(20),
                ScrapeMethod::Fast,
            ))
        }
    }

    #[derive(Debug)]
    struct HtmlModel;

    #[async_trait]
    impl GenerationModel for HtmlModel {
        fn name(&self) -> &str {
            "fixture"
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok("<h2>Overview</h2><p>rewritten body</p>".to_string())
        }
    }

    fn article(id: u64, title: &str) -> SourceArticle {
        SourceArticle {
            id,
            title: title.to_string(),
            url: format!("https://x.test/{}", id),
            content: "original".to_string(),
            author: "author".to_string(),
            updated_at: None,
        }
    }

    fn orchestrator(
        repository: MemoryRepository,
        search: Box<dyn SearchStrategy>,
    ) -> OptimizationOrchestrator {
        let acquisition = ContentAcquisitionService::new(
            SearchResultExtractor::with_strategies(vec![search]),
            PageContentExtractor::with_strategies(vec![Box::new(KeyedPages)]),
            Duration::ZERO,
        );
        OptimizationOrchestrator::new(
            Arc::new(repository),
            acquisition,
            ArticleSynthesizer::new(Arc::new(HtmlModel)),
            2,
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn test_end_to_end_success() {
        let repository = MemoryRepository::new(vec![article(7, "Chatbots 101")]);
        let orchestrator = orchestrator(
            repository.clone(),
            Box::new(SluggedSearch {
                results_per_query: 2,
            }),
        );

        let result = orchestrator.run_one(Some(7)).await.unwrap();
        assert!(result.success);
        assert_eq!(result.article_id, 7);
        assert_eq!(result.reference_count, Some(2));
        assert_eq!(result.title.as_deref(), Some("Chatbots 101"));

        let updates = repository.updates().await;
        assert_eq!(updates.len(), 1);
        let (id, published) = &updates[0];
        assert_eq!(*id, 7);
        assert_eq!(published.title, "Chatbots 101");
        assert_eq!(published.author, Provenance::AiOptimizer);
        assert!(published.content.contains("<h2>Overview</h2>"));
    }

    #[tokio::test]
    async fn test_run_one_without_id_picks_highest() {
        let repository =
            MemoryRepository::new(vec![article(1, "Older"), article(4, "Newest"), article(2, "Mid")]);
        let orchestrator = orchestrator(
            repository.clone(),
            Box::new(SluggedSearch {
                results_per_query: 1,
            }),
        );

        let result = orchestrator.run_one(None).await.unwrap();
        assert_eq!(result.article_id, 4);
    }

    #[tokio::test]
    async fn test_zero_candidates_aborts_before_scrape_or_publish() {
        let repository = MemoryRepository::new(vec![article(3, "Obscure Topic")]);
        let orchestrator = orchestrator(repository.clone(), Box::new(NoResultsSearch));

        let result = orchestrator.run_one(Some(3)).await;
        assert!(matches!(result, Err(Error::NoCandidates(_))));
        assert!(repository.updates().await.is_empty());
    }

    #[tokio::test]
    async fn test_zero_usable_documents_aborts() {
        let repository = MemoryRepository::new(vec![article(5, "Broken Everywhere")]);
        let orchestrator = orchestrator(
            repository.clone(),
            Box::new(SluggedSearch {
                results_per_query: 2,
            }),
        );

        let result = orchestrator.run_one(Some(5)).await;
        assert!(matches!(result, Err(Error::NoUsableContent(_))));
        assert!(repository.updates().await.is_empty());
    }

    #[tokio::test]
    async fn test_batch_isolates_per_article_failures() {
        let repository = MemoryRepository::new(vec![
            article(1, "Alpha Topic"),
            article(2, "Broken Topic"),
            article(3, "Gamma Topic"),
        ]);
        let orchestrator = orchestrator(
            repository.clone(),
            Box::new(SluggedSearch {
                results_per_query: 2,
            }),
        );

        let results = orchestrator.run_batch(Some(vec![1, 2, 3])).await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(results[0].success);
        assert!(!results[1].success);
        assert!(results[2].success);
        assert_eq!(results[1].article_id, 2);
        assert!(results[1].error.is_some());

        // The failed article published nothing; the other two did.
        assert_eq!(repository.updates().await.len(), 2);
    }

    #[tokio::test]
    async fn test_batch_without_ids_walks_all_articles_ascending() {
        let repository = MemoryRepository::new(vec![
            article(4, "Delta Topic"),
            article(1, "Alpha Topic"),
            article(3, "Gamma Topic"),
        ]);
        let orchestrator = orchestrator(
            repository.clone(),
            Box::new(SluggedSearch {
                results_per_query: 1,
            }),
        );

        let results = orchestrator.run_batch(None).await.unwrap();
        let ids: Vec<u64> = results.iter().map(|r| r.article_id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[tokio::test]
    async fn test_batch_result_error_names_missing_search_results() {
        let repository = MemoryRepository::new(vec![article(8, "Unfindable")]);
        let orchestrator = orchestrator(repository.clone(), Box::new(NoResultsSearch));

        let results = orchestrator.run_batch(Some(vec![8])).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(!results[0].success);
        assert!(results[0]
            .error
            .as_deref()
            .unwrap()
            .starts_with("No search results"));
    }
}
