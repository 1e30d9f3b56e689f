//! Deterministic prompt construction for the grading oracle.
//!
//! The rendered instruction block asks the oracle to act as an examiner and
//! report missing points, incorrect points, special considerations, and a
//! mark estimate under the stated rubric. The rubric text here is advisory
//! guidance for the oracle; [`crate::marks::calculate`] re-implements the
//! same rules authoritatively and never trusts the oracle's arithmetic.

use serde::{Deserialize, Serialize};

use crate::normalize::normalize;
use crate::types::GradingRequest;
use crate::EvaluationError;

/// Mark evaluation rules embedded in every grading request.
pub const RUBRIC_RULES: &str = r#"Mark Evaluation Rules:
a. Each point in the teacher's answer has equal weightage: weight_per_point = (Total Marks) / (number of distinct points in the teacher's answer).
b. For each missing point, deduct weight_per_point / 2.
c. For each incorrect point, deduct weight_per_point / 4.
d. If the student writes more correct points than the teacher's answer contains, no marks are deducted for the extras.
e. The student's marks must never exceed the total marks.
f. If the student's answer is the same as the teacher's answer, no marks are deducted.
g. Special Considerations: add or subtract marks for qualities outside the explicit point list, such as exceptional clarity or logical deductions beyond the expected answer.
h. Relevance: if the student's answer is not relevant to the teacher's answer, deduct 75% of the total marks."#;

/// Control-token wrapping required by a specific oracle.
///
/// Which tokens (if any) are needed is an implementation detail of the
/// inference backend in use; wrapping never alters the semantic content of
/// the instruction block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptFrame {
    pub prefix: String,
    pub suffix: String,
}

impl PromptFrame {
    /// Mixtral-style instruct framing.
    pub fn mixtral_instruct() -> Self {
        Self {
            prefix: "<s>[INST] ".to_string(),
            suffix: "\n [/INST] Model answer</s>".to_string(),
        }
    }

    /// No wrapping at all.
    pub fn none() -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
        }
    }

    pub fn apply(&self, body: &str) -> String {
        format!("{}{}{}", self.prefix, body, self.suffix)
    }
}

impl Default for PromptFrame {
    fn default() -> Self {
        Self::mixtral_instruct()
    }
}

/// Render the grading request into the oracle's wire format.
///
/// Both answers are normalized before inclusion. The relevance decision is
/// stated in the prompt so the oracle sees the pre-check outcome, but rule
/// (h) is enforced by the calculator regardless of what the oracle does
/// with it.
///
/// Fails with [`EvaluationError::InvalidRequest`] if the marks budget is
/// not a finite non-negative number; rendering itself cannot fail.
pub fn build_request(
    request: &GradingRequest,
    relevant: bool,
    frame: &PromptFrame,
) -> Result<String, EvaluationError> {
    request.validate()?;

    let student = normalize(&request.student_answer);
    let teacher = normalize(&request.teacher_answer);

    let relevance_note = if relevant {
        "A lexical pre-check judged the student answer topically related to the teacher's answer."
    } else {
        "A lexical pre-check judged the student answer NOT topically related to the teacher's answer."
    };

    let body = format!(
        r#"Assume you are an examiner.

Providing you the Student Answer and the Teacher's Answer below.

You have to provide the following details, in brief:
1. Missing Points: point by point (each point on a new line), the points missing from the student answer but present in the teacher's answer.
2. Incorrect Points: point by point (each point on a new line), the points present in the student answer that are factually incorrect.
3. Special Considerations: any special considerations that should impact the marks.
4. Student Marks: the student's marks based on the rules given below.

{RUBRIC_RULES}

{relevance_note}

StudentAnswer: "{student}"

TeacherAnswer: "{teacher}"

TotalMarks: "{total_marks}"
"#,
        total_marks = request.total_marks,
    );

    Ok(frame.apply(&body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GradingRequest {
        GradingRequest::new(
            "The heart pumps blood!",
            "The heart pumps blood through the body. It has four chambers.",
            10.0,
        )
        .unwrap()
    }

    #[test]
    fn test_prompt_contains_rubric_and_inputs() {
        let prompt = build_request(&request(), true, &PromptFrame::none()).unwrap();

        assert!(prompt.contains("Assume you are an examiner."));
        assert!(prompt.contains("Mark Evaluation Rules:"));
        assert!(prompt.contains("deduct weight_per_point / 2"));
        assert!(prompt.contains("deduct weight_per_point / 4"));
        assert!(prompt.contains("deduct 75% of the total marks"));
        assert!(prompt.contains(r#"TotalMarks: "10""#));
    }

    #[test]
    fn test_answers_are_normalized_in_prompt() {
        let prompt = build_request(&request(), true, &PromptFrame::none()).unwrap();

        assert!(prompt.contains(r#"StudentAnswer: "the heart pumps blood""#));
        assert!(prompt.contains(
            r#"TeacherAnswer: "the heart pumps blood through the body it has four chambers""#
        ));
    }

    #[test]
    fn test_relevance_note_reflects_decision() {
        let relevant = build_request(&request(), true, &PromptFrame::none()).unwrap();
        let off_topic = build_request(&request(), false, &PromptFrame::none()).unwrap();

        assert!(relevant.contains("topically related"));
        assert!(!relevant.contains("NOT topically related"));
        assert!(off_topic.contains("NOT topically related"));
    }

    #[test]
    fn test_frame_wraps_without_altering_body() {
        let bare = build_request(&request(), true, &PromptFrame::none()).unwrap();
        let framed = build_request(&request(), true, &PromptFrame::mixtral_instruct()).unwrap();

        assert!(framed.starts_with("<s>[INST] "));
        assert!(framed.ends_with("\n [/INST] Model answer</s>"));
        assert!(framed.contains(&bare));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let a = build_request(&request(), true, &PromptFrame::default()).unwrap();
        let b = build_request(&request(), true, &PromptFrame::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_marks_rejected_before_rendering() {
        let mut req = request();
        req.total_marks = f64::NAN;
        let err = build_request(&req, true, &PromptFrame::none()).unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidRequest(_)));
    }
}
