//! Lexical-overlap relevance gate.
//!
//! A cheap pre-check deciding whether a student answer is topically related
//! to the reference answer at all. The decision is advisory at this layer:
//! whether it affects the final score is arbitrated by
//! [`crate::marks::calculate`], never here.

use std::collections::HashSet;

use crate::normalize::NormalizedAnswer;

/// Overlap ratio below which an answer is considered off-topic.
pub const DEFAULT_RELEVANCE_THRESHOLD: f64 = 0.1;

/// Decide whether `student` is topically related to `teacher`.
///
/// Both answers are tokenized into unique-word sets; the ratio of shared
/// words to teacher words is compared against `threshold`.
///
/// An empty teacher answer has no words to compare against, so the check
/// passes vacuously instead of dividing by zero — the gate is a pre-filter,
/// not a correctness judge.
pub fn is_relevant(student: &NormalizedAnswer, teacher: &NormalizedAnswer, threshold: f64) -> bool {
    let teacher_words: HashSet<&str> = teacher.words().collect();
    if teacher_words.is_empty() {
        return true;
    }

    let student_words: HashSet<&str> = student.words().collect();
    let overlap = student_words.intersection(&teacher_words).count();
    let ratio = overlap as f64 / teacher_words.len() as f64;

    tracing::debug!(
        overlap,
        teacher_words = teacher_words.len(),
        ratio,
        threshold,
        "relevance pre-check"
    );

    ratio >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use proptest::prelude::*;

    #[test]
    fn test_identical_answers_are_relevant() {
        let t = normalize("gravity pulls objects toward the earth");
        assert!(is_relevant(&t.clone(), &t, DEFAULT_RELEVANCE_THRESHOLD));
    }

    #[test]
    fn test_disjoint_answers_are_not_relevant() {
        let s = normalize("the treaty of versailles ended the first world war");
        let t = normalize("photosynthesis happens in chloroplasts using sunlight");
        assert!(!is_relevant(&s, &t, DEFAULT_RELEVANCE_THRESHOLD));
    }

    #[test]
    fn test_empty_teacher_is_vacuously_relevant() {
        let s = normalize("anything at all");
        let t = normalize("");
        assert!(is_relevant(&s, &t, DEFAULT_RELEVANCE_THRESHOLD));
        assert!(is_relevant(&normalize(""), &t, DEFAULT_RELEVANCE_THRESHOLD));
    }

    #[test]
    fn test_empty_student_against_nonempty_teacher() {
        let s = normalize("");
        let t = normalize("some reference answer");
        assert!(!is_relevant(&s, &t, DEFAULT_RELEVANCE_THRESHOLD));
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        // 1 shared word out of 10 teacher words == exactly the 0.1 default.
        let t = normalize("one two three four five six seven eight nine ten");
        let s = normalize("five unrelated filler");
        assert!(is_relevant(&s, &t, 0.1));
        assert!(!is_relevant(&s, &t, 0.11));
    }

    #[test]
    fn test_duplicate_words_count_once() {
        let t = normalize("energy energy energy flows through trophic levels");
        let s = normalize("energy");
        // Teacher set: {energy, flows, through, trophic, levels} -> 1/5.
        assert!(is_relevant(&s, &t, 0.2));
        assert!(!is_relevant(&s, &t, 0.21));
    }

    fn word_list(range: std::ops::Range<usize>) -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec("[a-z]{1,8}", range)
    }

    proptest! {
        #[test]
        fn adding_a_teacher_word_never_lowers_relevance(
            teacher_words in word_list(1..10),
            student_words in word_list(0..10),
            pick in any::<prop::sample::Index>(),
        ) {
            let teacher = normalize(&teacher_words.join(" "));
            let base = normalize(&student_words.join(" "));

            let shared = pick.get(&teacher_words);
            let mut augmented_words = student_words.clone();
            augmented_words.push(shared.clone());
            let augmented = normalize(&augmented_words.join(" "));

            if is_relevant(&base, &teacher, 0.3) {
                prop_assert!(is_relevant(&augmented, &teacher, 0.3));
            }
        }

        #[test]
        fn gate_never_panics(s in ".*", t in ".*", threshold in -1.0f64..2.0) {
            let _ = is_relevant(&normalize(&s), &normalize(&t), threshold);
        }
    }
}
