//! Oracle feedback parsing.
//!
//! The oracle replies either with a JSON object matching
//! [`ModelOutput`](examiner_core::ModelOutput) or with the sectioned
//! narrative the prompt asks for. Either way the result is structured
//! findings plus the narrative kept for display.
//!
//! Text that fits neither shape is an error, not a guess — the caller
//! degrades to a textual result rather than best-effort scoring. The
//! oracle's own "Student Marks" estimate is never consumed; marks come
//! from `examiner_core::calculate` alone.

use examiner_core::ModelOutput;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Errors from feedback parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedbackError {
    #[error("feedback is empty")]
    Empty,

    #[error("no recognizable feedback sections in oracle output")]
    NoSections,
}

/// Parsed oracle feedback: structured findings plus the display narrative.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFeedback {
    pub output: ModelOutput,
    pub narrative: String,
}

lazy_static! {
    /// Section headings the prompt instructs the oracle to emit, with
    /// optional numbering and markdown emphasis.
    static ref HEADING: Regex = Regex::new(
        r"(?i)^\s*(?:\d+\.\s*)?\**\s*(missing points|incorrect points|special considerations|student marks)\s*\**\s*:?\s*(.*)$"
    ).unwrap();

    /// Bulleted or numbered list item.
    static ref BULLET: Regex = Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s*(.+)$").unwrap();

    /// First signed number in a special-considerations section.
    static ref SIGNED_NUMBER: Regex = Regex::new(r"[-+]?\d+(?:\.\d+)?").unwrap();
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    None,
    Missing,
    Incorrect,
    Special,
    /// "Student Marks" and anything else we deliberately do not consume.
    Ignored,
}

/// Parse oracle output into structured findings.
///
/// Structured JSON replies short-circuit the narrative parser; otherwise
/// the text is scanned for the sections the prompt requested. Points
/// phrased as "none"/"n/a" are treated as empty sections. The special
/// considerations adjustment is the first signed number in that section,
/// defaulting to 0 when the oracle states none.
pub fn parse_feedback(text: &str) -> Result<ParsedFeedback, FeedbackError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FeedbackError::Empty);
    }

    if let Some(output) = try_structured(trimmed) {
        return Ok(ParsedFeedback {
            output,
            narrative: trimmed.to_string(),
        });
    }

    let mut missing = Vec::new();
    let mut incorrect = Vec::new();
    let mut special_text = String::new();
    let mut section = Section::None;
    let mut saw_section = false;

    for line in trimmed.lines() {
        if let Some(caps) = HEADING.captures(line) {
            saw_section = true;
            section = match caps[1].to_lowercase().as_str() {
                "missing points" => Section::Missing,
                "incorrect points" => Section::Incorrect,
                "special considerations" => Section::Special,
                _ => Section::Ignored,
            };

            // Inline content after the heading belongs to the section.
            let rest = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            record(section, rest, &mut missing, &mut incorrect, &mut special_text);
            continue;
        }

        record(section, line, &mut missing, &mut incorrect, &mut special_text);
    }

    if !saw_section {
        return Err(FeedbackError::NoSections);
    }

    let special_considerations = SIGNED_NUMBER
        .find(&special_text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(ParsedFeedback {
        output: ModelOutput {
            missing_points: missing,
            incorrect_points: incorrect,
            special_considerations,
        },
        narrative: trimmed.to_string(),
    })
}

/// Accept a JSON reply only if it is an object carrying at least one of
/// the expected keys — an arbitrary JSON object must not parse as an
/// empty (full-marks) finding set.
fn try_structured(text: &str) -> Option<ModelOutput> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let object = value.as_object()?;

    const KNOWN_KEYS: [&str; 6] = [
        "missing_points",
        "Missing Points",
        "incorrect_points",
        "Incorrect Points",
        "special_considerations",
        "Special Considerations",
    ];
    if !KNOWN_KEYS.iter().any(|k| object.contains_key(*k)) {
        return None;
    }

    ModelOutput::from_json(text).ok()
}

fn record(
    section: Section,
    line: &str,
    missing: &mut Vec<String>,
    incorrect: &mut Vec<String>,
    special_text: &mut String,
) {
    match section {
        Section::Missing => {
            if let Some(point) = extract_point(line) {
                missing.push(point);
            }
        }
        Section::Incorrect => {
            if let Some(point) = extract_point(line) {
                incorrect.push(point);
            }
        }
        Section::Special => {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                special_text.push_str(trimmed);
                special_text.push(' ');
            }
        }
        Section::None | Section::Ignored => {}
    }
}

/// Extract the content of a list item, dropping bullet markers and
/// "no findings" placeholders.
fn extract_point(line: &str) -> Option<String> {
    let content = match BULLET.captures(line) {
        Some(caps) => caps[1].trim().to_string(),
        None => {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.to_string()
        }
    };

    // Stray markup or separator lines carry no point content.
    if !content.chars().any(|c| c.is_alphanumeric()) {
        return None;
    }

    let lowered = content.to_lowercase();
    let lowered = lowered.trim_end_matches('.');
    if matches!(lowered, "none" | "n/a" | "nothing" | "no missing points" | "no incorrect points") {
        return None;
    }

    Some(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parses_sectioned_narrative() {
        let text = "\
Missing Points:
- The role of chlorophyll
- Light-dependent reactions occur in thylakoids

Incorrect Points:
1. Stated that photosynthesis produces carbon dioxide

Special Considerations:
The diagram was exceptionally clear, add 0.5 marks.

Student Marks: 7.25";

        let parsed = parse_feedback(text).unwrap();
        assert_eq!(parsed.output.missing_points.len(), 2);
        assert_eq!(
            parsed.output.missing_points[0],
            "The role of chlorophyll"
        );
        assert_eq!(parsed.output.incorrect_points.len(), 1);
        assert_eq!(parsed.output.special_considerations, 0.5);
        assert_eq!(parsed.narrative, text.trim());
    }

    #[test]
    fn test_none_placeholders_yield_empty_sections() {
        let text = "\
Missing Points: None
Incorrect Points:
- N/A
Special Considerations: None.";

        let parsed = parse_feedback(text).unwrap();
        assert!(parsed.output.missing_points.is_empty());
        assert!(parsed.output.incorrect_points.is_empty());
        assert_eq!(parsed.output.special_considerations, 0.0);
    }

    #[test]
    fn test_negative_special_consideration() {
        let text = "\
Missing Points: None
Special Considerations: deducting -1.5 for illegible handwriting";

        let parsed = parse_feedback(text).unwrap();
        assert_eq!(parsed.output.special_considerations, -1.5);
    }

    #[test]
    fn test_markdown_and_numbered_headings() {
        let text = "\
1. **Missing Points:**
- point one
2. **Incorrect Points:**
- point two";

        let parsed = parse_feedback(text).unwrap();
        assert_eq!(parsed.output.missing_points, vec!["point one"]);
        assert_eq!(parsed.output.incorrect_points, vec!["point two"]);
    }

    #[test]
    fn test_student_marks_section_is_ignored() {
        let text = "\
Missing Points: None
Student Marks:
9.5 out of 10";

        let parsed = parse_feedback(text).unwrap();
        // The oracle's own estimate never becomes a finding or adjustment.
        assert!(parsed.output.missing_points.is_empty());
        assert_eq!(parsed.output.special_considerations, 0.0);
    }

    #[test]
    fn test_structured_json_reply() {
        let text = r#"{
            "Missing Points": ["chloroplast location"],
            "Incorrect Points": ["wrong gas named"],
            "Special Considerations": 1.0
        }"#;

        let parsed = parse_feedback(text).unwrap();
        assert_eq!(parsed.output.missing_points, vec!["chloroplast location"]);
        assert_eq!(parsed.output.incorrect_points, vec!["wrong gas named"]);
        assert_eq!(parsed.output.special_considerations, 1.0);
    }

    #[test]
    fn test_unrelated_json_object_is_not_a_finding_set() {
        let result = parse_feedback(r#"{"error": "model loading"}"#);
        assert_eq!(result, Err(FeedbackError::NoSections));
    }

    #[test]
    fn test_empty_and_sectionless_text() {
        assert_eq!(parse_feedback(""), Err(FeedbackError::Empty));
        assert_eq!(parse_feedback("   \n "), Err(FeedbackError::Empty));
        assert_eq!(
            parse_feedback("The student did reasonably well overall."),
            Err(FeedbackError::NoSections)
        );
    }

    proptest! {
        #[test]
        fn parser_never_panics(text in ".*") {
            let _ = parse_feedback(&text);
        }
    }
}
