use crate::models::question::Question;
use crate::models::quiz::{EmailStatus, Quiz};
use crate::models::submission::Submission;
use crate::models::video::VideoAnalysis;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Process-local storage for the quiz lifecycle. Entries live for the life
/// of the process; repeated writes for the same quiz id overwrite
/// (last write wins). Swappable for a durable store without touching the
/// routes, which only use the get/record methods below.
#[derive(Clone, Default)]
pub struct QuizStore {
    quizzes: Arc<RwLock<HashMap<String, Quiz>>>,
    questions: Arc<RwLock<HashMap<String, Vec<Question>>>>,
    submissions: Arc<RwLock<HashMap<String, Submission>>>,
    video_analyses: Arc<RwLock<HashMap<String, VideoAnalysis>>>,
}

impl QuizStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids are derived from epoch milliseconds. Collisions are accepted as
    /// negligible within a single low-throughput process; there is no
    /// cross-process uniqueness guarantee.
    fn next_quiz_id() -> String {
        format!("quiz_{}", Utc::now().timestamp_millis())
    }

    pub fn create_quiz(&self, quiz: Quiz, questions: Vec<Question>) -> String {
        let quiz_id = Self::next_quiz_id();
        self.quizzes
            .write()
            .expect("quiz map lock poisoned")
            .insert(quiz_id.clone(), quiz);
        self.questions
            .write()
            .expect("question map lock poisoned")
            .insert(quiz_id.clone(), questions);
        quiz_id
    }

    pub fn get_quiz(&self, quiz_id: &str) -> Option<Quiz> {
        self.quizzes
            .read()
            .expect("quiz map lock poisoned")
            .get(quiz_id)
            .cloned()
    }

    pub fn contains_quiz(&self, quiz_id: &str) -> bool {
        self.quizzes
            .read()
            .expect("quiz map lock poisoned")
            .contains_key(quiz_id)
    }

    pub fn get_questions(&self, quiz_id: &str) -> Option<Vec<Question>> {
        self.questions
            .read()
            .expect("question map lock poisoned")
            .get(quiz_id)
            .cloned()
    }

    /// Resend can point an existing quiz at a new address.
    pub fn set_quiz_email(&self, quiz_id: &str, email: &str) {
        if let Some(quiz) = self
            .quizzes
            .write()
            .expect("quiz map lock poisoned")
            .get_mut(quiz_id)
        {
            quiz.email = email.to_string();
        }
    }

    /// No-op when the quiz is unknown: the background email task must not
    /// fail because a dev reload cleared the maps.
    pub fn set_email_status(&self, quiz_id: &str, status: EmailStatus) {
        if let Some(quiz) = self
            .quizzes
            .write()
            .expect("quiz map lock poisoned")
            .get_mut(quiz_id)
        {
            quiz.email_status = Some(status);
        }
    }

    pub fn record_submission(&self, quiz_id: &str, submission: Submission) {
        self.submissions
            .write()
            .expect("submission map lock poisoned")
            .insert(quiz_id.to_string(), submission);
    }

    pub fn get_submission(&self, quiz_id: &str) -> Option<Submission> {
        self.submissions
            .read()
            .expect("submission map lock poisoned")
            .get(quiz_id)
            .cloned()
    }

    pub fn record_video_analysis(&self, quiz_id: &str, analysis: VideoAnalysis) {
        self.video_analyses
            .write()
            .expect("video analysis map lock poisoned")
            .insert(quiz_id.to_string(), analysis);
    }

    pub fn get_video_analysis(&self, quiz_id: &str) -> Option<VideoAnalysis> {
        self.video_analyses
            .read()
            .expect("video analysis map lock poisoned")
            .get(quiz_id)
            .cloned()
    }
}
