use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use ao_core::{
    Provenance, ReferenceArticle, Result, ScrapedDocument, SourceArticle, SynthesizedArticle,
};

use crate::models::GenerationModel;

const REFERENCE_PREVIEW_LEN: usize = 1500;

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new(r"```(?:html)?\n?").unwrap();
    static ref TITLE_TAG: Regex = Regex::new(r"(?is)<title>.*?</title>").unwrap();
    static ref H1_TAG: Regex = Regex::new(r"(?is)<h1[^>]*>.*?</h1>").unwrap();
}

/// Rewrites a source article against its scraped references through the
/// generation backend, degrading to deterministic content when the backend
/// is unavailable.
pub struct ArticleSynthesizer {
    model: Arc<dyn GenerationModel>,
}

impl ArticleSynthesizer {
    pub fn new(model: Arc<dyn GenerationModel>) -> Self {
        Self { model }
    }

    /// Synthesize the rewritten article. Backend failures of any kind
    /// (credentials, safety block, malformed response, timeout) degrade to
    /// the capacity notice; only conditions with no fallback left error.
    pub async fn synthesize(
        &self,
        source: &SourceArticle,
        references: &[ScrapedDocument],
    ) -> Result<SynthesizedArticle> {
        info!(
            "✍️ Synthesizing \"{}\" from {} reference(s)",
            source.title,
            references.len()
        );

        let (content, author) = match self.model.generate(&build_prompt(source, references)).await {
            Ok(raw) => (clean_generated(&raw), Provenance::AiOptimizer),
            Err(e) => {
                warn!(
                    "Generation backend failed ({}), falling back to notice content",
                    e
                );
                (capacity_notice(), Provenance::ManualOptimizer)
            }
        };

        Ok(SynthesizedArticle {
            title: source.title.clone(),
            content,
            author,
            url: source.url.clone(),
            reference_articles: references
                .iter()
                .map(|d| ReferenceArticle {
                    title: d.title.clone(),
                    url: d.url.clone(),
                })
                .collect(),
        })
    }

    /// Coarsest floor, used by the orchestrator when synthesis itself
    /// errors: keep the original visible and link back to it.
    pub fn original_content_fallback(source: &SourceArticle) -> SynthesizedArticle {
        let mut content = format!("<h2>{}</h2>\n\n", source.title);
        content.push_str(&format!(
            "<p>This article covers important information about <strong>{}</strong>. \
             For the most comprehensive and up-to-date information on this topic, \
             please visit the original source at:</p>\n\n",
            source.title
        ));
        content.push_str(&format!(
            "<p><a href=\"{0}\" target=\"_blank\" rel=\"noopener noreferrer\">{0}</a></p>\n",
            source.url
        ));

        SynthesizedArticle {
            title: source.title.clone(),
            content,
            author: Provenance::OriginalContent,
            url: source.url.clone(),
            reference_articles: Vec::new(),
        }
    }
}

fn build_prompt(source: &SourceArticle, references: &[ScrapedDocument]) -> String {
    let mut references_text = String::new();
    for (i, document) in references.iter().enumerate() {
        let preview: String = document.content.chars().take(REFERENCE_PREVIEW_LEN).collect();
        references_text.push_str(&format!("\n--- REFERENCE ARTICLE {} ---\n", i + 1));
        references_text.push_str(&format!("Title: {}\n", document.title));
        references_text.push_str(&format!("URL: {}\n", document.url));
        references_text.push_str(&format!("Content Preview: {}...\n", preview));
    }

    format!(
        "You are an expert content writer and SEO specialist. Your task is to rewrite and \
         optimize an article to match the style, formatting, and quality of top-ranking articles.\n\
         \n\
         ORIGINAL ARTICLE:\n\
         Title: {title}\n\
         URL: {url}\n\
         \n\
         TOP-RANKING REFERENCE ARTICLES:\n\
         {references}\n\
         \n\
         YOUR TASK:\n\
         1. Analyze the formatting, structure, and writing style of the reference articles\n\
         2. Rewrite the article about \"{title}\" to match the style and quality of the top-ranking articles\n\
         3. Maintain the core topic and message\n\
         4. Use similar headings structure, paragraph length, and content organization as the references\n\
         5. Make the content engaging, informative, and SEO-friendly\n\
         6. Ensure the content is unique and not a direct copy\n\
         7. Use HTML formatting for better readability (h2, h3, p, ul, ol, strong, em tags)\n\
         8. Aim for a comprehensive article (at least 1200-1500 words)\n\
         \n\
         FORMATTING REQUIREMENTS:\n\
         - Use proper HTML tags for structure (<h2>, <h3>, <p>, <ul>, <ol>, <strong>, <em>)\n\
         - Include clear headings and subheadings\n\
         - Break content into readable paragraphs\n\
         - Use bullet points or numbered lists where appropriate\n\
         - Ensure the content flows naturally and is easy to read\n\
         \n\
         OUTPUT REQUIREMENTS:\n\
         - Return ONLY the article content in HTML format\n\
         - Do NOT include the title in the output (it will be added separately)\n\
         - Do NOT include a references section (it will be added automatically)\n\
         - Start directly with the article content\n\
         - Make sure all HTML tags are properly closed\n\
         - Write in a professional, engaging tone\n\
         \n\
         Write the optimized article now:",
        title = source.title,
        url = source.url,
        references = references_text,
    )
}

/// Strips the artifacts the backend tends to echo around the article body.
fn clean_generated(content: &str) -> String {
    let content = CODE_FENCE.replace_all(content, "");
    let content = TITLE_TAG.replace_all(&content, "");
    let content = H1_TAG.replace_all(&content, "");
    content.trim().to_string()
}

fn capacity_notice() -> String {
    "This content was generated automatically. The content upgrade could not be completed \
     because the available generation API credits have been exhausted. To continue upgrading \
     content, please upgrade your API plan."
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ao_core::Error;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct CannedModel {
        response: Result<&'static str>,
    }

    impl CannedModel {
        fn ok(text: &'static str) -> Arc<Self> {
            Arc::new(Self { response: Ok(text) })
        }

        fn failing(message: &'static str) -> Arc<Self> {
            Arc::new(Self {
                response: Err(Error::Generation(message.to_string())),
            })
        }
    }

    #[async_trait]
    impl GenerationModel for CannedModel {
        fn name(&self) -> &str {
            "canned"
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            match &self.response {
                Ok(text) => Ok(text.to_string()),
                Err(Error::Generation(message)) => Err(Error::Generation(message.clone())),
                Err(_) => unreachable!(),
            }
        }
    }

    fn source() -> SourceArticle {
        SourceArticle {
            id: 7,
            title: "Chatbots 101".to_string(),
            url: "https://x.test/7".to_string(),
            content: "original body".to_string(),
            author: "Someone".to_string(),
            updated_at: None,
        }
    }

    fn references() -> Vec<ScrapedDocument> {
        vec![ScrapedDocument::new(
            "https://ref.test/a",
            "Ref A".to_string(),
            "reference text ".repeat(30),
            ao_core::ScrapeMethod::Fast,
        )]
    }

    #[tokio::test]
    async fn test_successful_generation_is_cleaned_and_marked_ai() {
        let model = CannedModel::ok("```html\n<h1>Echoed Title</h1><h2>Body</h2><p>text</p>\n```");
        let synthesizer = ArticleSynthesizer::new(model);
        let article = synthesizer.synthesize(&source(), &references()).await.unwrap();

        assert_eq!(article.author, Provenance::AiOptimizer);
        assert!(!article.content.contains("```"));
        assert!(!article.content.contains("<h1>"));
        assert!(article.content.contains("<h2>Body</h2>"));
        assert_eq!(article.title, "Chatbots 101");
        assert_eq!(article.reference_articles.len(), 1);
    }

    #[tokio::test]
    async fn test_backend_failure_degrades_to_manual_notice() {
        let model = CannedModel::failing("content blocked by safety filters");
        let synthesizer = ArticleSynthesizer::new(model);
        let article = synthesizer.synthesize(&source(), &references()).await.unwrap();

        assert_eq!(article.author, Provenance::ManualOptimizer);
        assert!(article.content.contains("could not be completed"));
    }

    #[tokio::test]
    async fn test_synthesize_accepts_empty_reference_list() {
        let model = CannedModel::failing("down");
        let synthesizer = ArticleSynthesizer::new(model);
        let article = synthesizer.synthesize(&source(), &[]).await.unwrap();
        assert_eq!(article.author, Provenance::ManualOptimizer);
        assert!(article.reference_articles.is_empty());
    }

    #[test]
    fn test_original_content_fallback_links_source() {
        let article = ArticleSynthesizer::original_content_fallback(&source());
        assert_eq!(article.author, Provenance::OriginalContent);
        assert!(article.content.contains("https://x.test/7"));
        assert!(article.content.contains("<h2>Chatbots 101</h2>"));
    }

    #[test]
    fn test_prompt_embeds_bounded_previews() {
        let mut long_reference = references();
        long_reference[0].content = "y".repeat(10_000);
        let prompt = build_prompt(&source(), &long_reference);
        assert!(prompt.contains("REFERENCE ARTICLE 1"));
        assert!(prompt.contains("https://ref.test/a"));
        assert!(!prompt.contains(&"y".repeat(2000)));
    }
}
