//! Language model client abstraction
//!
//! The analyzer, aggregator and fix generator take a `&dyn ModelClient`
//! constructed once at startup, so tests can substitute a scripted client.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use thiserror::Error;

/// Sampling parameters for one generation call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl From<&crate::config::ModelConfig> for GenerationOptions {
    fn from(config: &crate::config::ModelConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// Errors raised by a model provider
///
/// The rendered message carries the provider's own error text, since quota
/// exhaustion is only recognizable from that text.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Model request failed: {0}")]
    Transport(String),

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("API key not configured (set {0})")]
    MissingApiKey(String),
}

/// A text-in, text-out language model
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends `prompt` and returns the raw generated text
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ModelError>;
}
