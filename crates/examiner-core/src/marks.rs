//! Authoritative mark calculation.
//!
//! The rubric embedded in the oracle prompt is re-implemented here as a
//! pure function. The oracle's own mark estimate is non-deterministic and
//! unverifiable, so it is ignored; only the oracle's structured findings
//! feed this calculation.

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{GradeResult, ModelOutput};
use crate::EvaluationError;

/// Fraction of total marks deducted when the answer is off-topic.
const IRRELEVANCE_FACTOR: f64 = 0.75;

lazy_static! {
    /// Sentence and line boundaries that separate markable points.
    static ref POINT_BOUNDARY: Regex = Regex::new(r"[.!?;\n]+").unwrap();

    /// At least one word character makes a segment a real point.
    static ref WORD: Regex = Regex::new(r"\w").unwrap();
}

/// Count the distinct markable points in a raw teacher answer.
///
/// Points are sentence- or line-delimited segments containing at least one
/// word character. Runs on the raw answer, not the normalized form, because
/// normalization strips the very punctuation that delimits points.
///
/// A count of zero makes the rubric ungradeable; [`calculate`] rejects it.
pub fn teacher_point_count(answer: &str) -> usize {
    POINT_BOUNDARY
        .split(answer)
        .filter(|segment| WORD.is_match(segment))
        .count()
}

/// Compute the final score from the oracle's findings.
///
/// The scoring rule, applied in order:
/// 1. `weight_per_point = total_marks / teacher_point_count`
/// 2. each missing point deducts `weight_per_point / 2`
/// 3. each incorrect point deducts `weight_per_point / 4`
/// 4. an off-topic answer deducts 75% of total marks
/// 5. special considerations are added (signed)
/// 6. the result is clamped to `[0, total_marks]`
///
/// Errors with [`EvaluationError::InvalidRubric`] when
/// `teacher_point_count` is zero and [`EvaluationError::InvalidRequest`]
/// when the marks budget or adjustment is not a finite number. For any
/// other input this function is total: it returns a result, never panics.
pub fn calculate(
    output: &ModelOutput,
    total_marks: f64,
    teacher_point_count: usize,
    relevant: bool,
) -> Result<GradeResult, EvaluationError> {
    if !total_marks.is_finite() || total_marks < 0.0 {
        return Err(EvaluationError::InvalidRequest(format!(
            "total_marks must be a finite non-negative number, got {total_marks}"
        )));
    }
    if !output.special_considerations.is_finite() {
        return Err(EvaluationError::InvalidRequest(format!(
            "special_considerations must be finite, got {}",
            output.special_considerations
        )));
    }
    if teacher_point_count == 0 {
        return Err(EvaluationError::InvalidRubric(
            "teacher answer yields zero countable points; weight per point is undefined".to_string(),
        ));
    }

    let weight_per_point = total_marks / teacher_point_count as f64;
    let missing_deduction = output.missing_points.len() as f64 * weight_per_point / 2.0;
    let incorrect_deduction = output.incorrect_points.len() as f64 * weight_per_point / 4.0;
    let relevance_deduction = if relevant {
        0.0
    } else {
        IRRELEVANCE_FACTOR * total_marks
    };

    let raw = total_marks - missing_deduction - incorrect_deduction - relevance_deduction
        + output.special_considerations;
    let final_marks = raw.clamp(0.0, total_marks);

    Ok(GradeResult {
        final_marks,
        missing_count: output.missing_points.len(),
        incorrect_count: output.incorrect_points.len(),
        missing_deduction,
        incorrect_deduction,
        relevance_deduction,
        special_considerations: output.special_considerations,
        graded_at: Utc::now(),
    })
}
