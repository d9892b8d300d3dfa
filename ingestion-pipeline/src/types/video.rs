use serde::{Deserialize, Serialize};

/// Metadata and transcript fetched from the video platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoMetadata {
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(alias = "publishedAt")]
    pub published_at: String,
    #[serde(alias = "channelTitle")]
    pub channel_title: String,
    #[serde(default)]
    pub transcript: Vec<String>,
}
