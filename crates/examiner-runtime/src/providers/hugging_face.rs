//! Hugging Face Inference API provider.
//!
//! Speaks the hosted inference wire format: a bearer-authenticated POST of
//! `{"inputs": ..., "parameters": {...}}` answered by a list of
//! `{"generated_text": ...}` objects.

use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::{
    secrets::{ApiCredential, CredentialSource},
    GenerationConfig, GenerationResponse, InferenceProvider, ProviderError,
};

/// Environment variable holding the Hugging Face access token.
pub const HF_TOKEN_ENV: &str = "HF_TOKEN";

const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co/models";

/// Hugging Face hosted inference provider.
///
/// The access token is stored via [`ApiCredential`] and cannot be
/// accidentally printed or logged after construction.
pub struct HuggingFaceProvider {
    credential: ApiCredential,
    base_url: String,
}

impl fmt::Debug for HuggingFaceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HuggingFaceProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HuggingFaceProvider {
    /// Create a provider from an access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            credential: ApiCredential::new(
                token,
                CredentialSource::Programmatic,
                "Hugging Face access token",
            ),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create a provider from the `HF_TOKEN` environment variable.
    pub fn from_env() -> Result<Self, ProviderError> {
        let credential = ApiCredential::from_env(HF_TOKEN_ENV, "Hugging Face access token")?;
        Ok(Self {
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Create from JSON configuration with environment fallback.
    ///
    /// Checks `api_token` in the config, then the `HF_TOKEN` environment
    /// variable. `base_url` overrides the hosted endpoint (useful for
    /// self-hosted inference servers speaking the same format).
    pub fn from_config(config: &JsonValue) -> Result<Self, ProviderError> {
        let credential = ApiCredential::from_config_or_env(
            config,
            "api_token",
            HF_TOKEN_ENV,
            "Hugging Face access token",
        )?;

        let base_url = config["base_url"]
            .as_str()
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string();

        Ok(Self {
            credential,
            base_url,
        })
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn client(&self) -> &reqwest::Client {
        static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
        CLIENT.get_or_init(|| {
            reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client")
        })
    }
}

/// Inference API request format.
#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    return_full_text: bool,
}

/// Inference API response format.
#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct InferenceApiError {
    error: String,
}

#[async_trait]
impl InferenceProvider for HuggingFaceProvider {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResponse, ProviderError> {
        let request = InferenceRequest {
            inputs: prompt,
            parameters: InferenceParameters {
                max_new_tokens: config.max_new_tokens,
                return_full_text: config.return_full_text,
            },
        };

        // Expose the credential only here, at the point of use.
        let response = self
            .client()
            .post(format!("{}/{}", self.base_url, config.model))
            .bearer_auth(self.credential.expose())
            .timeout(config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(config.timeout)
                } else {
                    ProviderError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ProviderError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let error_body = response
                .json::<InferenceApiError>()
                .await
                .map_err(|e| ProviderError::ParseError(e.to_string()))?;

            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: error_body.error,
            });
        }

        let body: Vec<GeneratedText> = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let text = body
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or_else(|| ProviderError::ParseError("empty generation list".to_string()))?;

        Ok(GenerationResponse {
            text,
            model: config.model.clone(),
        })
    }

    async fn health_check(&self) -> bool {
        // Verify a token is present without logging its value.
        !self.credential.is_empty()
    }

    fn name(&self) -> &str {
        "hugging_face"
    }
}
