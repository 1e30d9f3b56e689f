//! End-to-end grading orchestrator.
//!
//! [`Examiner`] wires the deterministic core to an inference provider:
//! validate, normalize, relevance gate, prompt, oracle call (cached,
//! retried, bounded by a timeout), feedback parse, mark calculation.
//!
//! Each grading request is independent; the examiner holds no per-request
//! state and may be shared across concurrent submissions.

use std::sync::Arc;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use serde_json::Value as JsonValue;

use examiner_core::{
    build_request, calculate, is_relevant, normalize, teacher_point_count, EvaluationError,
    GradeResult, GradingRequest, PromptFrame, DEFAULT_RELEVANCE_THRESHOLD,
};

use crate::cache::{CacheKey, FeedbackCache};
use crate::feedback::{parse_feedback, ParsedFeedback};
use crate::providers::{GenerationConfig, GenerationResponse, InferenceProvider, ProviderError};

/// Runtime configuration for the examiner.
#[derive(Debug, Clone)]
pub struct ExaminerConfig {
    /// Generation settings passed to the provider
    pub generation: GenerationConfig,

    /// Maximum oracle attempts per grading request (at least 1)
    pub max_attempts: usize,

    /// Relevance gate threshold
    pub relevance_threshold: f64,

    /// Control-token framing for the prompt
    pub frame: PromptFrame,

    /// Feedback cache capacity
    pub cache_entries: u64,

    /// Feedback cache time-to-live
    pub cache_ttl: Duration,
}

impl Default for ExaminerConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            max_attempts: 3,
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
            frame: PromptFrame::default(),
            cache_entries: 10_000,
            cache_ttl: Duration::from_secs(3600),
        }
    }
}

impl ExaminerConfig {
    /// Build a config from JSON, accepting humantime duration strings.
    ///
    /// ```json
    /// {
    ///   "model": "mistralai/Mixtral-8x7B-Instruct-v0.1",
    ///   "max_new_tokens": 4000,
    ///   "timeout": "30s",
    ///   "max_attempts": 3,
    ///   "relevance_threshold": 0.1,
    ///   "cache_ttl": "1h"
    /// }
    /// ```
    pub fn from_json(config: &JsonValue) -> Result<Self, EvaluationError> {
        let mut cfg = Self::default();

        if let Some(model) = config["model"].as_str() {
            cfg.generation.model = model.to_string();
        }
        if let Some(tokens) = config["max_new_tokens"].as_u64() {
            cfg.generation.max_new_tokens = tokens as u32;
        }
        if let Some(timeout) = config["timeout"].as_str() {
            cfg.generation.timeout = parse_duration_field("timeout", timeout)?;
        }
        if let Some(attempts) = config["max_attempts"].as_u64() {
            cfg.max_attempts = (attempts as usize).max(1);
        }
        if let Some(threshold) = config["relevance_threshold"].as_f64() {
            cfg.relevance_threshold = threshold;
        }
        if let Some(entries) = config["cache_entries"].as_u64() {
            cfg.cache_entries = entries;
        }
        if let Some(ttl) = config["cache_ttl"].as_str() {
            cfg.cache_ttl = parse_duration_field("cache_ttl", ttl)?;
        }

        Ok(cfg)
    }
}

fn parse_duration_field(field: &str, value: &str) -> Result<Duration, EvaluationError> {
    humantime::parse_duration(value).map_err(|e| {
        EvaluationError::InvalidRequest(format!("bad {field} duration '{value}': {e}"))
    })
}

/// A completed grading: the authoritative result plus the oracle narrative
/// for display.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Deterministic scoring result
    pub result: GradeResult,

    /// The oracle's narrative feedback, kept verbatim
    pub narrative: String,

    /// Outcome of the lexical relevance pre-check
    pub relevant: bool,

    /// Whether the feedback came from the cache
    pub from_cache: bool,
}

/// Outcome of a grading attempt.
#[derive(Debug, Clone)]
pub enum GradeOutcome {
    /// The oracle answered and the score was computed.
    Graded(Evaluation),

    /// The oracle was unreachable or unintelligible; `message` explains
    /// and the caller may retry later.
    Degraded { message: String },
}

/// The examiner grades student answers end to end.
pub struct Examiner {
    provider: Arc<dyn InferenceProvider>,
    config: ExaminerConfig,
    cache: FeedbackCache,
}

impl Examiner {
    /// Create an examiner backed by the given provider.
    pub fn new(provider: Arc<dyn InferenceProvider>, config: ExaminerConfig) -> Self {
        let cache = FeedbackCache::new(config.cache_entries, config.cache_ttl);
        Self {
            provider,
            config,
            cache,
        }
    }

    pub fn builder() -> ExaminerBuilder {
        ExaminerBuilder::new()
    }

    /// Grade a student answer against the teacher's reference.
    ///
    /// Validation failures (`InvalidRequest`, `InvalidRubric`) are hard
    /// errors surfaced before any oracle call. Oracle failures produce
    /// [`GradeOutcome::Degraded`] instead of an error, so independently
    /// persisted question/answer records stay usable and the caller may
    /// retry.
    pub async fn grade(&self, request: &GradingRequest) -> Result<GradeOutcome, EvaluationError> {
        request.validate()?;

        let point_count = teacher_point_count(&request.teacher_answer);
        if point_count == 0 {
            return Err(EvaluationError::InvalidRubric(
                "teacher answer has no countable points; grading requires a non-trivial reference answer"
                    .to_string(),
            ));
        }

        let student = normalize(&request.student_answer);
        let teacher = normalize(&request.teacher_answer);
        let relevant = is_relevant(&student, &teacher, self.config.relevance_threshold);

        let prompt = build_request(request, relevant, &self.config.frame)?;

        let (feedback, from_cache) = match self.fetch_feedback(&prompt).await {
            Ok(pair) => pair,
            Err(message) => {
                tracing::warn!(%message, "grading degraded: oracle feedback unavailable");
                return Ok(GradeOutcome::Degraded { message });
            }
        };

        let result = calculate(&feedback.output, request.total_marks, point_count, relevant)?;

        tracing::debug!(
            final_marks = result.final_marks,
            missing = result.missing_count,
            incorrect = result.incorrect_count,
            relevant,
            from_cache,
            "grading complete"
        );

        Ok(GradeOutcome::Graded(Evaluation {
            result,
            narrative: feedback.narrative,
            relevant,
            from_cache,
        }))
    }

    /// Fetch parsed feedback for a prompt, via the cache or the provider.
    ///
    /// Errors are already rendered as the degraded-result message.
    async fn fetch_feedback(&self, prompt: &str) -> Result<(ParsedFeedback, bool), String> {
        let key = CacheKey::new(&self.config.generation.model, prompt);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok((cached, true));
        }

        let response = self.call_oracle(prompt).await.map_err(|e| {
            format!("Could not generate an evaluation due to an error, please try again later. Error: {e}")
        })?;

        let feedback = parse_feedback(&response.text).map_err(|e| {
            format!("The grading oracle returned feedback that could not be interpreted: {e}")
        })?;

        self.cache.insert(key, feedback.clone()).await;
        Ok((feedback, false))
    }

    /// Call the provider, retrying transient failures with backoff.
    ///
    /// The timeout is enforced here as well as inside the provider, so a
    /// misbehaving [`InferenceProvider`] implementation cannot stall a
    /// grading request indefinitely.
    async fn call_oracle(&self, prompt: &str) -> Result<GenerationResponse, ProviderError> {
        let attempts = self.config.max_attempts.max(1);
        let generation = &self.config.generation;

        (|| async {
            match tokio::time::timeout(generation.timeout, self.provider.generate(prompt, generation))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(generation.timeout)),
            }
        })
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(250))
                    .with_max_times(attempts - 1),
            )
            .when(ProviderError::is_transient)
            .notify(|err: &ProviderError, after: Duration| {
                tracing::warn!(error = %err, retry_in = ?after, "oracle call failed, retrying");
            })
            .await
    }
}

/// Builder for [`Examiner`].
pub struct ExaminerBuilder {
    provider: Option<Arc<dyn InferenceProvider>>,
    config: ExaminerConfig,
}

impl ExaminerBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            config: ExaminerConfig::default(),
        }
    }

    /// Set the inference provider.
    pub fn provider(mut self, provider: Arc<dyn InferenceProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: ExaminerConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the examiner.
    pub fn build(self) -> Result<Examiner, ProviderError> {
        let provider = self.provider.ok_or_else(|| {
            ProviderError::NotConfigured("no inference provider set".to_string())
        })?;

        Ok(Examiner::new(provider, self.config))
    }
}

impl Default for ExaminerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
