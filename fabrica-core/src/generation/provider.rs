//! Text generation backend trait

use crate::error::GenerationError;
use async_trait::async_trait;

/// Something that turns a prompt into generated text.
///
/// The pipeline calls it once per artisan and once per target language,
/// awaiting each call before issuing the next.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend name, for logs
    fn name(&self) -> &str;

    /// Generate text for a full prompt (instructions plus source text)
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
