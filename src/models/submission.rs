use serde::{Deserialize, Serialize};

/// The single current grading attempt for a quiz. A later submission
/// replaces the prior one; no history is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub answers: Vec<i64>,
    pub score: usize,
    pub total: usize,
    pub passed: bool,
}
