use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::models::submission::Submission;

const PASS_SUGGESTION: &str = "Great work! Prepare a concise project walkthrough for the video.";
const FAIL_SUGGESTION: &str =
    "Review foundational concepts and practice with targeted exercises.";

pub struct GradingService;

impl GradingService {
    /// Grades one answer sheet against the question set. Answers are
    /// positional: `answers[i]` is the selected option index for
    /// `questions[i]`.
    pub fn grade(questions: &[Question], answers: &[i64]) -> Result<Submission> {
        if answers.len() != questions.len() {
            return Err(Error::BadRequest("Answers length mismatch".to_string()));
        }

        let score = questions
            .iter()
            .zip(answers)
            .filter(|(q, &a)| a == q.correct_index as i64)
            .count();

        let total = questions.len();
        // 70% threshold with truncating multiplication, matching the
        // documented contract (10 questions -> 7, 3 questions -> 2).
        let threshold = std::cmp::max(1, (0.7 * total as f64) as usize);
        let passed = score >= threshold;

        Ok(Submission {
            answers: answers.to_vec(),
            score,
            total,
            passed,
        })
    }

    /// One fixed suggestion per outcome; nothing is generated.
    pub fn suggestions(passed: bool) -> Vec<String> {
        if passed {
            vec![PASS_SUGGESTION.to_string()]
        } else {
            vec![FAIL_SUGGESTION.to_string()]
        }
    }
}
