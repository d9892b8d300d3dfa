use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventDate {
    /// Date as phrased in the source, or the literal `"null"` when unspecific.
    #[serde(default)]
    pub human_readable: Option<String>,
    #[serde(default)]
    pub date_start_iso: Option<String>,
    #[serde(default)]
    pub date_end_iso: Option<String>,
}

/// One fact pulled out of a transcript by the summarizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractedSnippet {
    pub context: String,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub event_date: EventDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryResponse {
    pub full_summary: String,
    #[serde(default)]
    pub extracted_snippets: Vec<ExtractedSnippet>,
}
