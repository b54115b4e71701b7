use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;
use url::Url;

const PREFERRED_LANGS: [&str; 3] = ["en", "en-US", "en-GB"];

/// Fetches YouTube caption tracks from the public timedtext endpoint.
/// Transcript unavailability is never an error here; callers substitute a
/// placeholder when `fetch_transcript` comes back empty.
#[derive(Clone)]
pub struct CaptionService {
    client: Client,
}

impl CaptionService {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Accepted URL shapes: `youtu.be/<id>`, `youtube.com/watch?v=<id>`,
    /// `youtube.com/shorts/<id>`, `youtube.com/embed/<id>`.
    pub fn extract_video_id(raw_url: &str) -> Option<String> {
        let url = Url::parse(raw_url).ok()?;
        let host = url.host_str()?;

        if host == "youtu.be" {
            let id = url.path().trim_matches('/').split('/').next()?;
            return (!id.is_empty()).then(|| id.to_string());
        }

        if host == "youtube.com" || host.ends_with(".youtube.com") {
            if url.path() == "/watch" {
                return url
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.into_owned());
            }
            let mut segments = url.path_segments()?;
            let first = segments.next()?;
            if first == "shorts" || first == "embed" {
                let id = segments.next()?;
                return (!id.is_empty()).then(|| id.to_string());
            }
        }

        None
    }

    /// English captions first, then whatever English track the listing
    /// offers. `None` means no transcript could be obtained at all.
    pub async fn fetch_transcript(&self, video_id: &str) -> Option<String> {
        for lang in PREFERRED_LANGS {
            if let Some(text) = self.fetch_track(video_id, lang, false).await {
                return Some(text);
            }
        }

        let lang = self.list_english_track(video_id).await?;
        if let Some(text) = self.fetch_track(video_id, &lang, false).await {
            return Some(text);
        }
        // Auto-generated tracks live under a separate kind.
        self.fetch_track(video_id, &lang, true).await
    }

    async fn fetch_track(&self, video_id: &str, lang: &str, asr: bool) -> Option<String> {
        let mut url = format!(
            "https://www.youtube.com/api/timedtext?v={}&lang={}&fmt=json3",
            video_id, lang
        );
        if asr {
            url.push_str("&kind=asr");
        }

        let body = self.get_text(&url).await?;
        let parsed: JsonValue = serde_json::from_str(&body).ok()?;
        let events = parsed.get("events")?.as_array()?;

        let mut parts: Vec<String> = Vec::new();
        for event in events {
            let Some(segs) = event.get("segs").and_then(|s| s.as_array()) else {
                continue;
            };
            for seg in segs {
                if let Some(utf8) = seg.get("utf8").and_then(|u| u.as_str()) {
                    let trimmed = utf8.trim();
                    if !trimmed.is_empty() {
                        parts.push(trimmed.to_string());
                    }
                }
            }
        }

        let text = parts.join(" ");
        (!text.is_empty()).then_some(text)
    }

    async fn list_english_track(&self, video_id: &str) -> Option<String> {
        let url = format!(
            "https://www.youtube.com/api/timedtext?v={}&type=list",
            video_id
        );
        let listing = self.get_text(&url).await?;
        available_langs(&listing)
            .into_iter()
            .find(|code| code == "en" || code.starts_with("en-"))
    }

    async fn get_text(&self, url: &str) -> Option<String> {
        let res = self.client.get(url).send().await.ok()?;
        if !res.status().is_success() {
            return None;
        }
        let body = res.text().await.ok()?;
        (!body.is_empty()).then_some(body)
    }
}

impl Default for CaptionService {
    fn default() -> Self {
        Self::new()
    }
}

/// Pulls `lang_code` attribute values out of the track-listing XML. The
/// listing format is a flat attribute soup; a full XML parser buys nothing.
fn available_langs(listing: &str) -> Vec<String> {
    let mut langs = Vec::new();
    let mut rest = listing;
    while let Some(pos) = rest.find("lang_code=\"") {
        rest = &rest[pos + "lang_code=\"".len()..];
        if let Some(end) = rest.find('"') {
            langs.push(rest[..end].to_string());
            rest = &rest[end..];
        } else {
            break;
        }
    }
    langs
}
