use axum::{
    extract::{Multipart, State},
    response::Json,
};
use bytes::Bytes;

use crate::config::get_config;
use crate::dto::video_dto::{SubmitVideoResponse, SubmitVideoUrlRequest};
use crate::error::{Error, Result};
use crate::services::transcript_service::CaptionService;
use crate::services::video_service::{
    UPLOAD_PLACEHOLDER_TRANSCRIPT, URL_PLACEHOLDER_TRANSCRIPT,
};
use crate::AppState;

#[axum::debug_handler]
pub async fn submit_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SubmitVideoResponse>> {
    let mut quiz_id: Option<String> = None;
    let mut file: Option<(String, String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        if name == "quiz_id" {
            quiz_id = Some(field.text().await?);
        } else if name == "file" {
            let filename = field.file_name().unwrap_or("upload.bin").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await?;
            file = Some((filename, content_type, data));
        }
    }

    let quiz_id = quiz_id.ok_or_else(|| Error::BadRequest("Missing quiz_id field".to_string()))?;
    let (filename, content_type, data) =
        file.ok_or_else(|| Error::BadRequest("Missing file field".to_string()))?;
    if !state.store.contains_quiz(&quiz_id) {
        return Err(Error::NotFound("Quiz not found".to_string()));
    }

    let location = state
        .storage_service
        .store_upload(&quiz_id, &filename, &data, &content_type)
        .await?;

    let transcript = state
        .video_service
        .transcribe(&filename, data)
        .await
        .unwrap_or_else(|| UPLOAD_PLACEHOLDER_TRANSCRIPT.to_string());

    let (video_score, feedback) = state.video_service.evaluate_transcript(&transcript).await;
    let analysis = state.video_service.finalize(
        &state.store,
        &quiz_id,
        location,
        transcript,
        feedback,
        video_score,
    );

    tracing::info!(quiz_id = %quiz_id, score = analysis.video_score, selected = analysis.selected, "video upload processed");

    Ok(Json(SubmitVideoResponse::new(
        quiz_id,
        &analysis.transcript,
        analysis.selected,
        analysis.video_score,
    )))
}

#[axum::debug_handler]
pub async fn submit_video_url(
    State(state): State<AppState>,
    Json(req): Json<SubmitVideoUrlRequest>,
) -> Result<Json<SubmitVideoResponse>> {
    if !state.store.contains_quiz(&req.quiz_id) {
        return Err(Error::NotFound("Quiz not found".to_string()));
    }
    if !get_config().youtube_captions_enabled {
        return Err(Error::DependencyUnavailable(
            "YouTube transcript support is not available".to_string(),
        ));
    }

    let video_id = CaptionService::extract_video_id(&req.youtube_url)
        .ok_or_else(|| Error::BadRequest("Invalid YouTube URL".to_string()))?;

    let transcript = state
        .caption_service
        .fetch_transcript(&video_id)
        .await
        .unwrap_or_else(|| URL_PLACEHOLDER_TRANSCRIPT.to_string());

    let (video_score, feedback) = state.video_service.evaluate_transcript(&transcript).await;
    let analysis = state.video_service.finalize(
        &state.store,
        &req.quiz_id,
        format!("youtube:{}", video_id),
        transcript,
        feedback,
        video_score,
    );

    tracing::info!(quiz_id = %req.quiz_id, video_id = %video_id, score = analysis.video_score, "video url processed");

    Ok(Json(SubmitVideoResponse::new(
        req.quiz_id,
        &analysis.transcript,
        analysis.selected,
        analysis.video_score,
    )))
}
