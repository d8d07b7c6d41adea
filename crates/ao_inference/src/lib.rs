pub mod models;
pub mod synthesizer;

pub use models::{create_model, GenerationModel};
pub use synthesizer::ArticleSynthesizer;

pub mod prelude {
    pub use super::models::{create_model, GenerationModel};
    pub use super::synthesizer::ArticleSynthesizer;
    pub use ao_core::{Error, Result, SourceArticle, SynthesizedArticle};
}
