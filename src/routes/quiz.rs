use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde_json::{json, Value as JsonValue};
use validator::Validate;

use crate::config::get_config;
use crate::dto::quiz_dto::{
    FinalResultResponse, GenerateQuizRequest, GenerateQuizResponse, PublicQuestion,
    ResendEmailRequest, SubmitQuizRequest, SubmitQuizResponse, QUIZ_EXPIRES_IN_SECONDS,
};
use crate::error::{Error, Result};
use crate::models::quiz::Quiz;
use crate::services::grading_service::GradingService;
use crate::AppState;

#[axum::debug_handler]
pub async fn generate_quiz(
    State(state): State<AppState>,
    Json(req): Json<GenerateQuizRequest>,
) -> Result<Json<GenerateQuizResponse>> {
    req.validate()?;

    let questions = state
        .question_service
        .generate(&req.topic, req.num_questions as usize)
        .await;

    let quiz = Quiz::new(req.email.clone(), req.topic.clone(), req.num_questions);
    let quiz_id = state.store.create_quiz(quiz, questions.clone());
    let quiz_url = get_config().quiz_url(&quiz_id);

    // Email is fire-and-forget: the send runs on a spawned task and writes
    // its outcome back onto the quiz record.
    let email_queued = state.email_service.configured();
    if email_queued {
        tracing::info!(to = %req.email, url = %quiz_url, "queued quiz link email");
        let email_service = state.email_service.clone();
        let store = state.store.clone();
        let to = req.email.clone();
        let id = quiz_id.clone();
        tokio::spawn(async move {
            let status = email_service.send_quiz_link(&to, &id).await;
            store.set_email_status(&id, status);
        });
    } else {
        tracing::info!(to = %req.email, url = %quiz_url, "SMTP not configured; quiz link logged only");
    }

    Ok(Json(GenerateQuizResponse {
        quiz_id,
        questions: questions.iter().map(PublicQuestion::from).collect(),
        expires_in_seconds: QUIZ_EXPIRES_IN_SECONDS,
        quiz_url,
        email_queued,
    }))
}

#[axum::debug_handler]
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<Json<GenerateQuizResponse>> {
    if !state.store.contains_quiz(&quiz_id) {
        return Err(Error::NotFound("Quiz not found".to_string()));
    }
    let questions = state
        .store
        .get_questions(&quiz_id)
        .ok_or_else(|| Error::NotFound("Quiz not found".to_string()))?;

    Ok(Json(GenerateQuizResponse {
        quiz_url: get_config().quiz_url(&quiz_id),
        quiz_id,
        questions: questions.iter().map(PublicQuestion::from).collect(),
        expires_in_seconds: QUIZ_EXPIRES_IN_SECONDS,
        email_queued: state.email_service.configured(),
    }))
}

#[axum::debug_handler]
pub async fn submit_quiz(
    State(state): State<AppState>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<Json<SubmitQuizResponse>> {
    let questions = state
        .store
        .get_questions(&req.quiz_id)
        .ok_or_else(|| Error::NotFound("Quiz not found".to_string()))?;

    let submission = GradingService::grade(&questions, &req.answers)?;
    let suggestions = GradingService::suggestions(submission.passed);
    state.store.record_submission(&req.quiz_id, submission.clone());

    tracing::info!(
        quiz_id = %req.quiz_id,
        score = submission.score,
        passed = submission.passed,
        "quiz graded"
    );

    Ok(Json(SubmitQuizResponse {
        quiz_id: req.quiz_id,
        score: submission.score,
        total: submission.total,
        passed: submission.passed,
        suggestions,
    }))
}

#[axum::debug_handler]
pub async fn quiz_result(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<Json<SubmitQuizResponse>> {
    let submission = state
        .store
        .get_submission(&quiz_id)
        .ok_or_else(|| Error::NotFound("Result not found".to_string()))?;

    let suggestions = GradingService::suggestions(submission.passed);
    Ok(Json(SubmitQuizResponse {
        quiz_id,
        score: submission.score,
        total: submission.total,
        passed: submission.passed,
        suggestions,
    }))
}

/// Resend proceeds even for unknown quiz ids (a dev reload clears the
/// maps); the quiz record is only updated when present.
async fn resend(state: &AppState, quiz_id: &str, email: &str) -> Json<JsonValue> {
    let status = state.email_service.send_quiz_link(email, quiz_id).await;
    if state.store.contains_quiz(quiz_id) {
        state.store.set_quiz_email(quiz_id, email);
        state.store.set_email_status(quiz_id, status.clone());
    }
    Json(json!({ "ok": true, "status": status }))
}

#[axum::debug_handler]
pub async fn resend_quiz_email(
    State(state): State<AppState>,
    Json(req): Json<ResendEmailRequest>,
) -> Json<JsonValue> {
    resend(&state, &req.quiz_id, &req.email).await
}

#[axum::debug_handler]
pub async fn resend_quiz_email_get(
    State(state): State<AppState>,
    Query(req): Query<ResendEmailRequest>,
) -> Json<JsonValue> {
    resend(&state, &req.quiz_id, &req.email).await
}

#[axum::debug_handler]
pub async fn final_result(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Json<FinalResultResponse> {
    let passed_quiz = state.store.get_submission(&quiz_id).map(|s| s.passed);
    let analysis = state.store.get_video_analysis(&quiz_id);

    Json(FinalResultResponse {
        quiz_id,
        passed_quiz,
        selected: analysis.as_ref().map(|a| a.selected),
        feedback: analysis.as_ref().map(|a| a.feedback.clone()),
        video_score: analysis.map(|a| a.video_score),
    })
}
