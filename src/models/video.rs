use serde::{Deserialize, Serialize};

/// Stored outcome of evaluating a candidate's follow-up video. `location`
/// is a local path, an `s3://` URI, or a `youtube:<id>` tag. `selected` is
/// derived (`passed && score >= 70`) and recomputed on every submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoAnalysis {
    pub location: String,
    pub transcript: String,
    pub feedback: String,
    pub video_score: u32,
    pub selected: bool,
}
