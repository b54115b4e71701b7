use crate::models::question::Question;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const QUIZ_EXPIRES_IN_SECONDS: u64 = 60 * 60;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateQuizRequest {
    pub email: String,
    pub topic: String,
    #[validate(range(min = 1, max = 30))]
    pub num_questions: u32,
}

/// Question as shown to the candidate: the correct index never leaves the
/// server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.clone(),
            text: q.text.clone(),
            options: q.options.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateQuizResponse {
    pub quiz_id: String,
    pub questions: Vec<PublicQuestion>,
    pub expires_in_seconds: u64,
    pub quiz_url: String,
    pub email_queued: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResendEmailRequest {
    pub quiz_id: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitQuizRequest {
    pub quiz_id: String,
    pub answers: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitQuizResponse {
    pub quiz_id: String,
    pub score: usize,
    pub total: usize,
    pub passed: bool,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalResultResponse {
    pub quiz_id: String,
    pub passed_quiz: Option<bool>,
    pub selected: Option<bool>,
    pub feedback: Option<String>,
    pub video_score: Option<u32>,
}
