//! Shared value types for the grading pipeline.
//!
//! Every entity here is transient: computed once per grading request, never
//! shared or mutated afterwards. Persistence of questions and reference
//! answers belongs to an external collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::EvaluationError;

/// An immutable grading request: the two answers under comparison and the
/// marks budget for the question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradingRequest {
    /// The student's answer, raw as submitted
    pub student_answer: String,

    /// The teacher's reference answer
    pub teacher_answer: String,

    /// Marks budget for the question; must be finite and non-negative
    pub total_marks: f64,
}

impl GradingRequest {
    /// Create a request, validating the marks budget.
    pub fn new(
        student_answer: impl Into<String>,
        teacher_answer: impl Into<String>,
        total_marks: f64,
    ) -> Result<Self, EvaluationError> {
        let request = Self {
            student_answer: student_answer.into(),
            teacher_answer: teacher_answer.into(),
            total_marks,
        };
        request.validate()?;
        Ok(request)
    }

    /// Reject non-finite or negative marks budgets before any oracle work.
    pub fn validate(&self) -> Result<(), EvaluationError> {
        if !self.total_marks.is_finite() || self.total_marks < 0.0 {
            return Err(EvaluationError::InvalidRequest(format!(
                "total_marks must be a finite non-negative number, got {}",
                self.total_marks
            )));
        }
        Ok(())
    }
}

/// Structured feedback from the grading oracle.
///
/// Any field the oracle leaves out defaults: no findings, zero adjustment.
/// The title-cased aliases accept the field names the oracle is instructed
/// to use in its reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelOutput {
    /// Teacher points absent from the student answer
    #[serde(alias = "Missing Points")]
    pub missing_points: Vec<String>,

    /// Student points that are factually wrong
    #[serde(alias = "Incorrect Points")]
    pub incorrect_points: Vec<String>,

    /// Signed mark adjustment for qualities outside the point list
    #[serde(alias = "Special Considerations")]
    pub special_considerations: f64,
}

impl ModelOutput {
    /// Parse a structured oracle reply.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// The authoritative grading outcome, with every deduction term exposed for
/// auditability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradeResult {
    /// Final score, clamped to `[0, total_marks]`
    pub final_marks: f64,

    /// Number of missing points reported by the oracle
    pub missing_count: usize,

    /// Number of incorrect points reported by the oracle
    pub incorrect_count: usize,

    /// Marks removed for missing points
    pub missing_deduction: f64,

    /// Marks removed for incorrect points
    pub incorrect_deduction: f64,

    /// Marks removed because the answer was off-topic (0 when relevant)
    pub relevance_deduction: f64,

    /// Signed adjustment carried over from the oracle
    pub special_considerations: f64,

    /// When the score was computed
    pub graded_at: DateTime<Utc>,
}
