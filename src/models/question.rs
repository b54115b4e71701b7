use serde::{Deserialize, Serialize};

pub const OPTIONS_PER_QUESTION: usize = 4;

/// One multiple-choice question. `correct_index` is always a valid index
/// into `options`; the generator enforces this before a question is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}
