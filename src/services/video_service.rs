use crate::models::video::VideoAnalysis;
use crate::store::QuizStore;
use bytes::Bytes;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;

pub const DEFAULT_VIDEO_SCORE: u32 = 60;
pub const DEFAULT_FEEDBACK: &str =
    "Strong fundamentals; consider deeper examples of real-world integrations.";
pub const UPLOAD_PLACEHOLDER_TRANSCRIPT: &str =
    "Candidate presented a solid understanding of basics and project overview.";
pub const URL_PLACEHOLDER_TRANSCRIPT: &str =
    "Transcript unavailable; evaluate based on overall content quality heuristics.";

pub const SELECTION_SCORE_THRESHOLD: u32 = 70;

/// Transcribes uploaded videos and scores transcripts with the reviewer
/// model. Every external failure degrades to a fixed default; this service
/// never fails a request.
#[derive(Clone)]
pub struct VideoService {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl VideoService {
    pub fn new(api_key: Option<String>, model: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }

    /// whisper-1 transcription; `None` on any failure so the caller can
    /// substitute the placeholder transcript.
    pub async fn transcribe(&self, filename: &str, data: Bytes) -> Option<String> {
        let api_key = self.api_key.as_ref()?;

        let part = reqwest::multipart::Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")
            .ok()?;
        let form = reqwest::multipart::Form::new()
            .text("model", "whisper-1")
            .part("file", part);

        let res = self
            .client
            .post("https://api.openai.com/v1/audio/transcriptions")
            .bearer_auth(api_key)
            .multipart(form)
            .timeout(Duration::from_secs(300))
            .send()
            .await
            .ok()?;

        if !res.status().is_success() {
            tracing::warn!(status = %res.status(), "transcription request failed");
            return None;
        }

        let body: JsonValue = res.json().await.ok()?;
        let text = body.get("text")?.as_str()?.trim().to_string();
        (!text.is_empty()).then_some(text)
    }

    /// Scores a transcript. Without a configured reviewer, or on any
    /// failure, the fixed defaults are returned.
    pub async fn evaluate_transcript(&self, transcript: &str) -> (u32, String) {
        let Some(api_key) = self.api_key.as_ref() else {
            return (DEFAULT_VIDEO_SCORE, DEFAULT_FEEDBACK.to_string());
        };

        let prompt = format!(
            "You are an admissions reviewer. Read the transcript and return STRICT JSON with this schema:\n{{\n  \"score\": number (0-100 integer),\n  \"feedback\": string (1-2 sentences)\n}}\n\nEvaluate clarity, technical depth, relevance to topic, and communication.\nTranscript:\n{}",
            transcript
        );
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [ {"role": "user", "content": prompt} ],
            "temperature": 0.2,
        });

        let content = match self.chat_completion(api_key, payload).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(error = ?e, "video evaluation failed; using defaults");
                return (DEFAULT_VIDEO_SCORE, DEFAULT_FEEDBACK.to_string());
            }
        };

        parse_evaluation(&content)
    }

    async fn chat_completion(
        &self,
        api_key: &str,
        payload: JsonValue,
    ) -> crate::error::Result<String> {
        let res = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(api_key)
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("OpenAI API Error {}: {}", status, text).into());
        }

        let body: JsonValue = res.json().await?;
        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response format").into())
    }

    /// Reads the stored submission, recomputes selection, and overwrites
    /// the quiz's video analysis. Selection is derived here and nowhere
    /// else: `passed && score >= 70`.
    pub fn finalize(
        &self,
        store: &QuizStore,
        quiz_id: &str,
        location: String,
        transcript: String,
        feedback: String,
        video_score: u32,
    ) -> VideoAnalysis {
        let passed = store
            .get_submission(quiz_id)
            .map(|s| s.passed)
            .unwrap_or(false);
        let analysis = VideoAnalysis {
            location,
            transcript,
            feedback,
            video_score,
            selected: selection(passed, video_score),
        };
        store.record_video_analysis(quiz_id, analysis.clone());
        analysis
    }
}

pub fn selection(passed_quiz: bool, video_score: u32) -> bool {
    passed_quiz && video_score >= SELECTION_SCORE_THRESHOLD
}

/// Strict JSON first; otherwise recover the first 1-3 digit run from the
/// raw text and treat the text itself as feedback.
pub fn parse_evaluation(content: &str) -> (u32, String) {
    if let Ok(obj) = serde_json::from_str::<JsonValue>(content) {
        let score = obj
            .get("score")
            .and_then(|s| s.as_i64())
            .map(clamp_score)
            .unwrap_or(DEFAULT_VIDEO_SCORE);
        let feedback = obj
            .get("feedback")
            .and_then(|f| f.as_str())
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_FEEDBACK)
            .to_string();
        return (score, feedback);
    }

    let score = leading_int_run(content)
        .map(|n| clamp_score(n as i64))
        .unwrap_or(DEFAULT_VIDEO_SCORE);
    let trimmed = content.trim();
    let feedback = if trimmed.is_empty() {
        DEFAULT_FEEDBACK.to_string()
    } else {
        trimmed.to_string()
    };
    (score, feedback)
}

fn clamp_score(score: i64) -> u32 {
    score.clamp(0, 100) as u32
}

/// First run of consecutive ASCII digits, capped at three.
fn leading_int_run(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .take(3)
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Question;
    use crate::models::quiz::Quiz;
    use crate::models::submission::Submission;

    #[test]
    fn selection_and_law() {
        assert!(!selection(true, 69));
        assert!(selection(true, 70));
        assert!(selection(true, 100));
        assert!(!selection(false, 100));
        assert!(!selection(false, 0));
    }

    #[test]
    fn strict_json_evaluation_is_clamped() {
        let (score, feedback) = parse_evaluation(r#"{"score": 130, "feedback": "Sharp."}"#);
        assert_eq!(score, 100);
        assert_eq!(feedback, "Sharp.");

        let (score, _) = parse_evaluation(r#"{"score": -5, "feedback": "Weak."}"#);
        assert_eq!(score, 0);
    }

    #[test]
    fn recovery_extracts_first_digit_run() {
        let (score, feedback) = parse_evaluation("I would rate this 85 out of 100.");
        assert_eq!(score, 85);
        assert_eq!(feedback, "I would rate this 85 out of 100.");

        // Four-digit runs are capped at three digits, then clamped.
        let (score, _) = parse_evaluation("rating: 1000");
        assert_eq!(score, 100);
    }

    #[test]
    fn recovery_defaults_when_no_digits() {
        let (score, feedback) = parse_evaluation("no verdict");
        assert_eq!(score, DEFAULT_VIDEO_SCORE);
        assert_eq!(feedback, "no verdict");

        let (score, feedback) = parse_evaluation("   ");
        assert_eq!(score, DEFAULT_VIDEO_SCORE);
        assert_eq!(feedback, DEFAULT_FEEDBACK);
    }

    #[test]
    fn json_without_fields_falls_back_to_defaults() {
        let (score, feedback) = parse_evaluation("{}");
        assert_eq!(score, DEFAULT_VIDEO_SCORE);
        assert_eq!(feedback, DEFAULT_FEEDBACK);
    }

    #[tokio::test]
    async fn evaluate_without_key_returns_defaults() {
        let svc = VideoService::new(None, "gpt-4o-mini".into(), reqwest::Client::new());
        let (score, feedback) = svc.evaluate_transcript("anything").await;
        assert_eq!(score, DEFAULT_VIDEO_SCORE);
        assert_eq!(feedback, DEFAULT_FEEDBACK);
    }

    #[test]
    fn finalize_recomputes_selection_and_overwrites() {
        let store = QuizStore::new();
        let quiz_id = store.create_quiz(
            Quiz::new("a@example.com".into(), "Rust".into(), 1),
            vec![Question {
                id: "q1".into(),
                text: "?".into(),
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_index: 0,
            }],
        );
        let svc = VideoService::new(None, "gpt-4o-mini".into(), reqwest::Client::new());

        // No submission yet: selected must be false even with a top score.
        let analysis = svc.finalize(
            &store,
            &quiz_id,
            "youtube:abc".into(),
            "t".into(),
            "f".into(),
            95,
        );
        assert!(!analysis.selected);

        store.record_submission(
            &quiz_id,
            Submission {
                answers: vec![0],
                score: 1,
                total: 1,
                passed: true,
            },
        );
        let analysis = svc.finalize(
            &store,
            &quiz_id,
            "youtube:abc".into(),
            "t".into(),
            "f".into(),
            95,
        );
        assert!(analysis.selected);
        assert!(store.get_video_analysis(&quiz_id).unwrap().selected);
    }
}
