use serde::{Deserialize, Serialize};

use super::{summary::ExtractedSnippet, SummaryResponse, VideoMetadata};

/// Platform metadata joined with its summary; the unit that gets backed up and ingested.
///
/// Built once through [`VideoRecord::new`] or loaded from a backup, then only read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoRecord {
    video_id: String,
    title: String,
    #[serde(default)]
    description: String,
    url: String,
    #[serde(alias = "publishedAt")]
    published_at: String,
    #[serde(alias = "channelTitle")]
    channel_title: String,
    #[serde(default)]
    transcript: Vec<String>,
    full_summary: String,
    #[serde(default)]
    extracted_snippets: Vec<ExtractedSnippet>,
}

impl VideoRecord {
    pub fn new(video: VideoMetadata, summary: SummaryResponse) -> Self {
        let VideoMetadata {
            video_id,
            title,
            description,
            url,
            published_at,
            channel_title,
            transcript,
        } = video;
        let SummaryResponse {
            full_summary,
            extracted_snippets,
        } = summary;

        Self {
            video_id,
            title,
            description,
            url,
            published_at,
            channel_title,
            transcript,
            full_summary,
            extracted_snippets,
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Calendar date (`YYYY-MM-DD`) or empty when the platform gave none.
    pub fn published_at(&self) -> &str {
        &self.published_at
    }

    pub fn channel_title(&self) -> &str {
        &self.channel_title
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn full_summary(&self) -> &str {
        &self.full_summary
    }

    pub fn extracted_snippets(&self) -> &[ExtractedSnippet] {
        &self.extracted_snippets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loads_backups_written_with_platform_field_names() {
        let raw = json!({
            "video_id": "-HOp7_-cxTw",
            "title": "Talk",
            "description": "sources",
            "url": "https://www.youtube.com/watch?v=-HOp7_-cxTw",
            "publishedAt": "2024-03-01",
            "channelTitle": "Jane Doe",
            "transcript": ["hello", "world"],
            "full_summary": "# Summary",
            "extracted_snippets": [
                {
                    "context": "A fact",
                    "entities": ["Rust"],
                    "event_date": {
                        "human_readable": "null",
                        "date_start_iso": null,
                        "date_end_iso": null
                    }
                }
            ]
        });

        let record: VideoRecord = serde_json::from_value(raw).expect("record decodes");

        assert_eq!(record.channel_title(), "Jane Doe");
        assert_eq!(record.published_at(), "2024-03-01");
        assert_eq!(record.extracted_snippets().len(), 1);
        assert_eq!(
            record.extracted_snippets()[0].event_date.human_readable.as_deref(),
            Some("null")
        );
    }
}
