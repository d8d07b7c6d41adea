use std::env;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Process-wide configuration, read once at startup and shared immutably.
#[derive(Debug, Clone)]
pub struct Config {
    pub repository: RepositoryConfig,
    pub generation: GenerationConfig,
    pub search: SearchConfig,
    pub scraping: ScrapingConfig,
}

#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub base_url: String,
    pub results_to_fetch: usize,
}

#[derive(Debug, Clone)]
pub struct ScrapingConfig {
    pub user_agent: String,
    pub request_timeout: Duration,
    pub navigation_timeout: Duration,
    pub settle_delay: Duration,
    pub scrape_delay: Duration,
    pub batch_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repository: RepositoryConfig {
                base_url: "http://127.0.0.1:8000/api".to_string(),
                timeout: Duration::from_secs(15),
            },
            generation: GenerationConfig {
                api_key: None,
                model: "gemini-pro".to_string(),
                temperature: 0.7,
                max_output_tokens: 8000,
                timeout: Duration::from_secs(90),
            },
            search: SearchConfig {
                base_url: "https://www.google.com/search".to_string(),
                results_to_fetch: 2,
            },
            scraping: ScrapingConfig {
                user_agent: DEFAULT_USER_AGENT.to_string(),
                request_timeout: Duration::from_secs(15),
                navigation_timeout: Duration::from_secs(30),
                settle_delay: Duration::from_secs(2),
                scrape_delay: Duration::from_secs(1),
                batch_delay: Duration::from_secs(5),
            },
        }
    }
}

impl Config {
    /// Build the configuration from environment variables, falling back to
    /// the defaults above for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("REPOSITORY_API_BASE_URL") {
            config.repository.base_url = url;
        }
        config.generation.api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());
        if let Ok(model) = env::var("GEMINI_MODEL") {
            config.generation.model = model;
        }
        if let Ok(agent) = env::var("USER_AGENT") {
            config.scraping.user_agent = agent;
        }
        if let Some(n) = env_parse::<usize>("SEARCH_RESULTS_TO_FETCH") {
            config.search.results_to_fetch = n;
        }
        if let Some(ms) = env_parse::<u64>("SCRAPE_DELAY_MS") {
            config.scraping.scrape_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = env_parse::<u64>("BATCH_DELAY_MS") {
            config.scraping.batch_delay = Duration::from_millis(ms);
        }

        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
