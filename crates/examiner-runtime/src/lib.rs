//! # examiner-runtime
//!
//! LLM-assisted grading runtime for the examiner workspace.
//!
//! `examiner-core` is fully deterministic and performs no I/O. This crate
//! adds the fallible half of the pipeline: a provider abstraction over
//! remote inference APIs, parsing of oracle feedback, response caching,
//! and the end-to-end [`Examiner`] orchestrator.
//!
//! ## Failure isolation
//!
//! Validation errors (`InvalidRequest`, `InvalidRubric`) are surfaced
//! before any oracle call. Oracle unavailability or unintelligible output
//! degrades to a textual result — it never crashes the caller and never
//! corrupts independently persisted question/answer records.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use examiner_core::GradingRequest;
//! use examiner_runtime::{Examiner, ExaminerConfig, GradeOutcome, HuggingFaceProvider};
//!
//! let provider = Arc::new(HuggingFaceProvider::from_env()?);
//! let examiner = Examiner::new(provider, ExaminerConfig::default());
//!
//! let request = GradingRequest::new(student_answer, teacher_answer, 10.0)?;
//! match examiner.grade(&request).await? {
//!     GradeOutcome::Graded(evaluation) => println!("{}", evaluation.result.final_marks),
//!     GradeOutcome::Degraded { message } => eprintln!("{message}"),
//! }
//! ```

pub mod cache;
pub mod examiner;
pub mod feedback;
pub mod providers;

// Re-export main types at crate root
pub use cache::{CacheKey, FeedbackCache};
pub use examiner::{Evaluation, Examiner, ExaminerBuilder, ExaminerConfig, GradeOutcome};
pub use feedback::{parse_feedback, FeedbackError, ParsedFeedback};
pub use providers::{
    ApiCredential, CredentialSource, GenerationConfig, GenerationResponse, HuggingFaceProvider,
    InferenceProvider, ProviderError,
};
