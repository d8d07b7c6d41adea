use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Article record owned by the external content repository. Read-only input
/// to an optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceArticle {
    pub id: u64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One entry extracted from a search-results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeMethod {
    Fast,
    Rendered,
    Failed,
}

/// Result of extracting one page. `error` is set iff `method == Failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedDocument {
    pub url: String,
    pub title: String,
    pub content: String,
    pub method: ScrapeMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScrapedDocument {
    pub fn new(url: &str, title: String, content: String, method: ScrapeMethod) -> Self {
        Self {
            url: url.to_string(),
            title,
            content,
            method,
            error: None,
        }
    }

    /// The failure shape: placeholder content, method pinned to `Failed`.
    pub fn failed(url: &str, error: String) -> Self {
        Self {
            url: url.to_string(),
            title: "Scraping Failed".to_string(),
            content: format!("Failed to scrape content from {}", url),
            method: ScrapeMethod::Failed,
            error: Some(error),
        }
    }

    /// A document is usable when nothing went wrong and there is enough
    /// text to serve as reference material.
    pub fn is_usable(&self) -> bool {
        self.error.is_none() && self.content.len() > 200
    }
}

/// Which synthesis tier produced the published content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    #[serde(rename = "AI Optimizer")]
    AiOptimizer,
    #[serde(rename = "Manual Optimizer")]
    ManualOptimizer,
    #[serde(rename = "Original Content")]
    OriginalContent,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::AiOptimizer => "AI Optimizer",
            Provenance::ManualOptimizer => "Manual Optimizer",
            Provenance::OriginalContent => "Original Content",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceArticle {
    pub title: String,
    pub url: String,
}

/// The rewritten article submitted back to the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizedArticle {
    pub title: String,
    pub content: String,
    pub author: Provenance,
    pub url: String,
    pub reference_articles: Vec<ReferenceArticle>,
}

/// Terminal report for one article's optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub success: bool,
    pub article_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<ReferenceArticle>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OptimizationResult {
    pub fn completed(
        article: &SourceArticle,
        references: &[ScrapedDocument],
        synthesized: &SynthesizedArticle,
    ) -> Self {
        Self {
            success: true,
            article_id: article.id,
            title: Some(article.title.clone()),
            original_url: Some(article.url.clone()),
            reference_count: Some(references.len()),
            content_length: Some(synthesized.content.len()),
            references: Some(
                references
                    .iter()
                    .map(|d| ReferenceArticle {
                        title: d.title.clone(),
                        url: d.url.clone(),
                    })
                    .collect(),
            ),
            error: None,
        }
    }

    pub fn failed(article_id: u64, error: String) -> Self {
        Self {
            success: false,
            article_id,
            title: None,
            original_url: None,
            reference_count: None,
            content_length: None,
            references: None,
            error: Some(error),
        }
    }
}
