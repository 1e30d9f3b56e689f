//! # examiner-core
//!
//! Deterministic answer-evaluation scoring engine.
//!
//! Given a student answer, a teacher's reference answer, and a total-marks
//! budget, this crate builds the grading request sent to an external oracle
//! and converts the oracle's structured feedback into a bounded final score.
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No LLM calls**: The oracle lives in `examiner-runtime`; this crate
//!    only renders its request and scores its response
//! 3. **Bounded**: `final_marks` always lands in `[0, total_marks]`
//! 4. **Total**: Scoring never panics; degenerate rubrics are rejected with
//!    typed errors before any division
//!
//! ## Example
//!
//! ```rust,ignore
//! use examiner_core::{calculate, prepare, GradingRequest, ModelOutput, PromptFrame};
//!
//! let request = GradingRequest::new(
//!     "Photosynthesis converts light into chemical energy.",
//!     "Photosynthesis converts light energy into chemical energy. It occurs in chloroplasts.",
//!     10.0,
//! )?;
//!
//! let prepared = prepare(&request, 0.1, &PromptFrame::default())?;
//! // ... send prepared.prompt to the oracle, parse its reply into ModelOutput ...
//! let output = ModelOutput::default();
//! let result = calculate(&output, request.total_marks, prepared.teacher_point_count, prepared.relevant)?;
//! assert!(result.final_marks <= request.total_marks);
//! ```

pub mod marks;
pub mod normalize;
pub mod prompt;
pub mod relevance;
pub mod types;

// Re-export main types at crate root
pub use marks::{calculate, teacher_point_count};
pub use normalize::{normalize, NormalizedAnswer};
pub use prompt::{build_request, PromptFrame, RUBRIC_RULES};
pub use relevance::{is_relevant, DEFAULT_RELEVANCE_THRESHOLD};
pub use types::{GradeResult, GradingRequest, ModelOutput};

use thiserror::Error;

/// Errors that can occur while preparing or scoring a grading request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// Malformed or missing required field, rejected before any oracle call.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Teacher answer yields zero countable points; weight per point is
    /// undefined and grading cannot proceed.
    #[error("Invalid rubric: {0}")]
    InvalidRubric(String),
}

/// Everything the caller needs before invoking the oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedGrading {
    /// The rendered oracle request, control tokens applied
    pub prompt: String,

    /// Outcome of the lexical relevance pre-check
    pub relevant: bool,

    /// Distinct markable points counted in the teacher answer
    pub teacher_point_count: usize,
}

/// Prepare a grading request for the oracle.
///
/// Validates the request, normalizes both answers, runs the relevance
/// pre-check, counts teacher points, and renders the prompt. This is the
/// deterministic front half of the pipeline; feed the oracle's parsed reply
/// to [`calculate`] for the back half.
pub fn prepare(
    request: &GradingRequest,
    relevance_threshold: f64,
    frame: &PromptFrame,
) -> Result<PreparedGrading, EvaluationError> {
    request.validate()?;

    let student = normalize(&request.student_answer);
    let teacher = normalize(&request.teacher_answer);
    let relevant = is_relevant(&student, &teacher, relevance_threshold);
    let prompt = build_request(request, relevant, frame)?;

    Ok(PreparedGrading {
        prompt,
        relevant,
        teacher_point_count: teacher_point_count(&request.teacher_answer),
    })
}
