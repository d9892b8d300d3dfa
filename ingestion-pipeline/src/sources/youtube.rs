use chrono::DateTime;
use common::{error::AppError, utils::config::AppConfig};
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use crate::types::VideoMetadata;

const WATCH_URL: &str = "https://www.youtube.com/watch";

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    #[serde(default)]
    description: String,
    published_at: String,
    channel_title: String,
}

#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<CaptionEvent>,
}

#[derive(Debug, Deserialize)]
struct CaptionEvent {
    #[serde(default)]
    segs: Vec<CaptionSegment>,
}

#[derive(Debug, Deserialize)]
struct CaptionSegment {
    #[serde(default)]
    utf8: String,
}

/// Fetches video metadata from the YouTube Data API and captions from the timed-text endpoint.
pub struct YoutubeClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    transcript_base: String,
    language: String,
}

impl YoutubeClient {
    pub fn new(
        http: reqwest::Client,
        api_base: &str,
        api_key: &str,
        transcript_base: &str,
        language: &str,
    ) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            transcript_base: transcript_base.to_string(),
            language: language.to_string(),
        }
    }

    pub fn from_config(http: reqwest::Client, config: &AppConfig) -> Self {
        Self::new(
            http,
            &config.youtube_base_url,
            &config.youtube_api_key,
            &config.transcript_base_url,
            &config.transcript_language,
        )
    }

    pub async fn extract(&self, video_id: &str) -> Result<VideoMetadata, AppError> {
        info!(video_id, "fetching video metadata");
        let snippet = self.fetch_snippet(video_id).await?;

        let transcript = match self.fetch_transcript(video_id).await {
            Ok(lines) => lines,
            Err(err) => {
                warn!(video_id, error = %err, "transcript unavailable; continuing without it");
                Vec::new()
            }
        };
        if transcript.is_empty() {
            warn!(video_id, "video has no transcript lines");
        }

        Ok(VideoMetadata {
            video_id: video_id.to_string(),
            title: snippet.title,
            description: snippet.description,
            url: watch_url(video_id)?,
            published_at: calendar_date(&snippet.published_at),
            channel_title: snippet.channel_title,
            transcript,
        })
    }

    async fn fetch_snippet(&self, video_id: &str) -> Result<VideoSnippet, AppError> {
        let response: VideoListResponse = self
            .http
            .get(format!("{}/videos", self.api_base))
            .query(&[
                ("part", "snippet"),
                ("id", video_id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .items
            .into_iter()
            .next()
            .map(|item| item.snippet)
            .ok_or_else(|| AppError::NotFound(format!("video {video_id} not found")))
    }

    async fn fetch_transcript(&self, video_id: &str) -> Result<Vec<String>, AppError> {
        let body = self
            .http
            .get(&self.transcript_base)
            .query(&[
                ("v", video_id),
                ("lang", self.language.as_str()),
                ("fmt", "json3"),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_timed_text(&body)
    }
}

fn watch_url(video_id: &str) -> Result<String, AppError> {
    Url::parse_with_params(WATCH_URL, &[("v", video_id)])
        .map(String::from)
        .map_err(|e| AppError::Validation(format!("invalid video id {video_id}: {e}")))
}

/// Reduces an RFC 3339 timestamp to `YYYY-MM-DD`; other input is passed through.
fn calendar_date(published_at: &str) -> String {
    DateTime::parse_from_rfc3339(published_at).map_or_else(
        |_| published_at.to_string(),
        |timestamp| timestamp.date_naive().format("%Y-%m-%d").to_string(),
    )
}

fn parse_timed_text(body: &str) -> Result<Vec<String>, AppError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let timed_text: TimedText = serde_json::from_str(body)?;
    Ok(timed_text
        .events
        .into_iter()
        .map(|event| {
            event
                .segs
                .into_iter()
                .map(|seg| seg.utf8)
                .collect::<String>()
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_text_events_become_transcript_lines() {
        let body = r#"{
            "events": [
                { "tStartMs": 0, "segs": [{ "utf8": "hello " }, { "utf8": "there" }] },
                { "tStartMs": 900 },
                { "tStartMs": 1200, "segs": [{ "utf8": "\n" }] },
                { "tStartMs": 1500, "segs": [{ "utf8": "second line" }] }
            ]
        }"#;

        let lines = parse_timed_text(body).expect("parses");
        assert_eq!(lines, vec!["hello there", "second line"]);
    }

    #[test]
    fn empty_caption_body_means_no_transcript() {
        assert!(parse_timed_text("").expect("empty ok").is_empty());
    }

    #[test]
    fn published_timestamp_is_reduced_to_a_date() {
        assert_eq!(calendar_date("2024-03-01T17:30:00Z"), "2024-03-01");
        assert_eq!(calendar_date("2024-03-01"), "2024-03-01");
    }

    #[test]
    fn watch_url_encodes_the_video_id() {
        assert_eq!(
            watch_url("-HOp7_-cxTw").expect("url"),
            "https://www.youtube.com/watch?v=-HOp7_-cxTw"
        );
    }
}
