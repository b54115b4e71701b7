use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery outcome of the quiz-link email, written back asynchronously
/// by the background send task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailStatus {
    pub queued: bool,
    pub sent: bool,
    pub error: Option<String>,
}

impl EmailStatus {
    pub fn not_configured() -> Self {
        Self {
            queued: false,
            sent: false,
            error: Some("not_configured".to_string()),
        }
    }

    pub fn sent() -> Self {
        Self {
            queued: true,
            sent: true,
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            queued: true,
            sent: false,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub email: String,
    pub topic: String,
    pub num_questions: u32,
    pub created_at: DateTime<Utc>,
    pub email_status: Option<EmailStatus>,
}

impl Quiz {
    pub fn new(email: String, topic: String, num_questions: u32) -> Self {
        Self {
            email,
            topic,
            num_questions,
            created_at: Utc::now(),
            email_status: None,
        }
    }
}
