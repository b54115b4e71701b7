pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use crate::services::{
    email_service::EmailService, question_service::QuestionService,
    storage_service::StorageService, transcript_service::CaptionService,
    video_service::VideoService,
};
use crate::store::QuizStore;
use reqwest::Client;

#[derive(Clone)]
pub struct AppState {
    pub store: QuizStore,
    pub question_service: QuestionService,
    pub video_service: VideoService,
    pub caption_service: CaptionService,
    pub storage_service: StorageService,
    pub email_service: EmailService,
}

impl AppState {
    pub fn new() -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap();

        let question_service = QuestionService::new(
            config.openai_api_key.clone(),
            config.openai_questions_model.clone(),
            http_client.clone(),
        );
        let video_service = VideoService::new(
            config.openai_api_key.clone(),
            config.openai_feedback_model.clone(),
            http_client,
        );
        let caption_service = CaptionService::new();
        let storage_service =
            StorageService::new(config.s3_bucket.clone(), config.s3_region.clone());
        let email_service = EmailService::from_config(config);

        Self {
            store: QuizStore::new(),
            question_service,
            video_service,
            caption_service,
            storage_service,
            email_service,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
