pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::Error;
pub use types::{
    OptimizationResult, Provenance, ReferenceArticle, ScrapeMethod, ScrapedDocument,
    SearchCandidate, SourceArticle, SynthesizedArticle,
};

pub type Result<T> = std::result::Result<T, Error>;
