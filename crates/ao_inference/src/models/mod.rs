use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use ao_core::config::GenerationConfig;
use ao_core::Result;

pub mod gemini;

/// Prompt-in / text-out seam to the generation backend.
#[async_trait]
pub trait GenerationModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub fn create_model(config: &GenerationConfig) -> Arc<dyn GenerationModel> {
    Arc::new(gemini::GeminiModel::new(config.clone()))
}
