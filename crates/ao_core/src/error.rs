use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Rendering error: {0}")]
    Render(String),

    #[error("Rendering backend unavailable: {0}")]
    RenderUnavailable(String),

    #[error("No search results found: {0}")]
    NoCandidates(String),

    #[error("No usable content: {0}")]
    NoUsableContent(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
