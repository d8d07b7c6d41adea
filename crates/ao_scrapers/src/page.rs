use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use ao_core::config::ScrapingConfig;
use ao_core::{Error, Result, ScrapeMethod, ScrapedDocument};

use crate::render::{RenderOptions, RenderSession};

const MIN_CONTENT_LEN: usize = 200;
const MIN_PARAGRAPH_LEN: usize = 30;

const UNWANTED_SELECTORS: &str = "script, style, nav, header, footer, aside, iframe, noscript, \
     .advertisement, .ads, .social-share, .comments";

// Tried in order; the first selector with enough text wins.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "[role=\"main\"]",
    ".post-content",
    ".article-content",
    ".entry-content",
    ".content",
    "main",
    ".post",
    ".blog-post",
];

lazy_static! {
    static ref HORIZONTAL_WS: Regex = Regex::new(r"[ \t\r]+").unwrap();
    static ref BLANK_LINES: Regex = Regex::new(r"\n[ \t]*(?:\n[ \t]*)+").unwrap();
}

/// One way of turning a URL into a ScrapedDocument. Strategies are tried in
/// priority order by [`PageContentExtractor`].
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn extract(&self, url: &str) -> Result<ScrapedDocument>;
}

/// Static-HTML extraction over plain HTTP.
pub struct FastExtraction {
    client: Client,
}

impl FastExtraction {
    pub fn new(config: &ScrapingConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }
}

#[async_trait]
impl ExtractionStrategy for FastExtraction {
    fn name(&self) -> &str {
        "fast"
    }

    async fn extract(&self, url: &str) -> Result<ScrapedDocument> {
        let response = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await?
            .error_for_status()?;

        if let Some(content_type) = response.headers().get(reqwest::header::CONTENT_TYPE) {
            let value = content_type.to_str().unwrap_or_default();
            if !value.contains("html") && !value.contains("text") {
                return Err(Error::Scraping(format!(
                    "{} returned non-HTML content ({})",
                    url, value
                )));
            }
        }

        let html = response.text().await?;
        Ok(extract_document(url, &html, ScrapeMethod::Fast))
    }
}

/// Script-executed extraction through a headless browser session.
pub struct RenderedExtraction {
    config: ScrapingConfig,
}

impl RenderedExtraction {
    pub fn new(config: &ScrapingConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait]
impl ExtractionStrategy for RenderedExtraction {
    fn name(&self) -> &str {
        "rendered"
    }

    async fn extract(&self, url: &str) -> Result<ScrapedDocument> {
        let session = RenderSession::launch(false).await?;
        let options = RenderOptions {
            user_agent: self.config.user_agent.clone(),
            navigation_timeout: self.config.navigation_timeout,
            settle_delay: self.config.settle_delay,
            stealth: false,
        };
        let html = session.fetch_html(url, &options).await;
        session.close().await;

        Ok(extract_document(url, &html?, ScrapeMethod::Rendered))
    }
}

/// Extracts a title and body text from arbitrary HTML documents, escalating
/// through its strategies until one produces a usable document.
pub struct PageContentExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl PageContentExtractor {
    pub fn new(config: &ScrapingConfig) -> Self {
        Self::with_strategies(vec![
            Box::new(FastExtraction::new(config)),
            Box::new(RenderedExtraction::new(config)),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Extract one page. Only a rendering backend that cannot start
    /// propagates; every other failure folds into a `Failed` document so a
    /// multi-URL batch keeps going.
    pub async fn extract(&self, url: &str) -> Result<ScrapedDocument> {
        let mut last_error: Option<Error> = None;
        let last = self.strategies.len().saturating_sub(1);

        for (i, strategy) in self.strategies.iter().enumerate() {
            match strategy.extract(url).await {
                Ok(document) if document.is_usable() => {
                    info!(
                        "📄 Extracted {} chars from {} ({})",
                        document.content.len(),
                        url,
                        strategy.name()
                    );
                    return Ok(document);
                }
                Ok(document) if i == last => {
                    debug!(
                        "Keeping short {} document for {} ({} chars)",
                        strategy.name(),
                        url,
                        document.content.len()
                    );
                    return Ok(document);
                }
                Ok(document) => {
                    debug!(
                        "{} extraction too short for {} ({} chars), escalating",
                        strategy.name(),
                        url,
                        document.content.len()
                    );
                }
                Err(e @ Error::RenderUnavailable(_)) => return Err(e),
                Err(e) => {
                    warn!("{} extraction failed for {}: {}", strategy.name(), url, e);
                    last_error = Some(e);
                }
            }
        }

        let message = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no extraction strategy produced content".to_string());
        Ok(ScrapedDocument::failed(url, message))
    }
}

/// Shared extraction core: both tiers feed their HTML through this.
pub(crate) fn extract_document(url: &str, html: &str, method: ScrapeMethod) -> ScrapedDocument {
    let mut document = Html::parse_document(html);
    strip_unwanted(&mut document);

    let title = extract_title(&document);

    let mut content = String::new();
    for selector in CONTENT_SELECTORS {
        let selector = Selector::parse(selector).unwrap();
        if let Some(element) = document.select(&selector).next() {
            let text = normalize_whitespace(&element.text().collect::<String>());
            if text.len() > MIN_CONTENT_LEN {
                content = text;
                break;
            }
        }
    }

    // No selector held enough text; harvest paragraphs in document order.
    if content.len() <= MIN_CONTENT_LEN {
        let paragraph = Selector::parse("p").unwrap();
        content = document
            .select(&paragraph)
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .filter(|text| text.len() > MIN_PARAGRAPH_LEN)
            .collect::<Vec<_>>()
            .join("\n\n");
    }

    ScrapedDocument::new(url, title, content, method)
}

fn strip_unwanted(document: &mut Html) {
    let unwanted = Selector::parse(UNWANTED_SELECTORS).unwrap();
    let ids: Vec<_> = document.select(&unwanted).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn extract_title(document: &Html) -> String {
    let h1 = Selector::parse("h1").unwrap();
    if let Some(element) = document.select(&h1).next() {
        let text = element.text().collect::<String>().trim().to_string();
        if !text.is_empty() {
            return text;
        }
    }

    let title = Selector::parse("title").unwrap();
    if let Some(element) = document.select(&title).next() {
        let text = element.text().collect::<String>().trim().to_string();
        if !text.is_empty() {
            return text;
        }
    }

    let og_title = Selector::parse("meta[property=\"og:title\"]").unwrap();
    document
        .select(&og_title)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn normalize_whitespace(text: &str) -> String {
    let collapsed = HORIZONTAL_WS.replace_all(text, " ");
    let collapsed = BLANK_LINES.replace_all(&collapsed, "\n\n");
    collapsed.trim().to_string()
}
