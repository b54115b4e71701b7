use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitVideoUrlRequest {
    pub quiz_id: String,
    pub youtube_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitVideoResponse {
    pub quiz_id: String,
    pub status: String,
    pub transcript_preview: String,
    pub selected: bool,
    pub video_score: u32,
}

impl SubmitVideoResponse {
    /// The preview carries the first 120 characters of the transcript.
    pub fn new(quiz_id: String, transcript: &str, selected: bool, video_score: u32) -> Self {
        Self {
            quiz_id,
            status: "processing_complete".to_string(),
            transcript_preview: transcript.chars().take(120).collect(),
            selected,
            video_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_is_capped_at_120_chars() {
        let transcript = "x".repeat(500);
        let resp = SubmitVideoResponse::new("quiz_1".into(), &transcript, false, 60);
        assert_eq!(resp.transcript_preview.chars().count(), 120);
        assert_eq!(resp.status, "processing_complete");

        let short = SubmitVideoResponse::new("quiz_1".into(), "short", true, 90);
        assert_eq!(short.transcript_preview, "short");
    }
}
