//! Oracle provider abstractions for examiner-runtime.
//!
//! A provider turns a rendered grading prompt into generated text. The
//! trait seam keeps the scoring engine independent of any particular
//! inference backend and lets tests run against a mock.
//!
//! ## Security
//!
//! Providers store API tokens via the [`secrets`] module so credentials
//! cannot leak through `Debug` output or error messages.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

mod hugging_face;
pub mod secrets;

pub use hugging_face::{HuggingFaceProvider, HF_TOKEN_ENV};
pub use secrets::{ApiCredential, CredentialSource};

/// Errors from inference providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Response parse error: {0}")]
    ParseError(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Whether retrying the same call could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::HttpError(_)
            | ProviderError::RateLimited { .. }
            | ProviderError::Timeout(_) => true,
            ProviderError::ApiError { status, .. } => *status >= 500,
            ProviderError::ParseError(_) | ProviderError::NotConfigured(_) => false,
        }
    }
}

/// Configuration for a single generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Model identifier, e.g. "mistralai/Mixtral-8x7B-Instruct-v0.1"
    pub model: String,

    /// Maximum tokens the oracle may generate
    pub max_new_tokens: u32,

    /// Whether the response should echo the prompt
    pub return_full_text: bool,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "mistralai/Mixtral-8x7B-Instruct-v0.1".to_string(),
            max_new_tokens: 4000,
            return_full_text: false,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Raw text generated by the oracle for one prompt.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    /// The generated text
    pub text: String,

    /// Model that produced it
    pub model: String,
}

/// Provider abstraction: `prompt -> generated text`.
///
/// This is the only place the runtime performs network I/O. Everything
/// upstream (prompt rendering) and downstream (feedback parsing, mark
/// calculation) is deterministic.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Generate a completion for a rendered grading prompt.
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResponse, ProviderError>;

    /// Check if the provider is usable at all.
    async fn health_check(&self) -> bool;

    /// Provider name for logs and cache keys.
    fn name(&self) -> &str;
}
