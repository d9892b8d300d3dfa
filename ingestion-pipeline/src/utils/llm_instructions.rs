use std::path::Path;

use common::error::AppError;
use serde_json::json;

pub static DEFAULT_SUMMARY_SYSTEM_PROMPT: &str = r#"You are a research assistant that turns video transcripts into durable notes.

You will receive the title, the description (which often lists sources) and the full transcript of one video. Produce:

1. "full_summary": a comprehensive summary of the transcript in markdown. Use headings and bullet points, keep the speaker's argument order, and include the sources mentioned in the description when they support a point.
2. "extracted_snippets": the individual facts, claims or events worth keeping as standalone notes. For each snippet:
   - "context": the specific fact, stated so it can be understood without the video.
   - "entities": the key people, organizations, resources or concepts involved, using their most common full name.
   - "event_date": when the fact happened, if the transcript says so.
     - "human_readable": the date as phrased in the text, or "null" if it is not specific.
     - "date_start_iso": the start date as YYYY-MM-DD, or null.
     - "date_end_iso": the end date as YYYY-MM-DD, or null.

List snippets in the order they appear in the transcript. Do not invent facts, dates or entities that the material does not support."#;

pub fn get_summary_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "full_summary": {
                "type": "string",
                "description": "A comprehensive summary of the transcript in markdown format."
            },
            "extracted_snippets": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "context": {
                            "type": "string",
                            "description": "The specific text or fact extracted from the transcript."
                        },
                        "entities": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "Key resources, people, or concepts involved."
                        },
                        "event_date": {
                            "type": "object",
                            "properties": {
                                "human_readable": { "type": ["string", "null"] },
                                "date_start_iso": { "type": ["string", "null"] },
                                "date_end_iso": { "type": ["string", "null"] }
                            },
                            "required": ["human_readable", "date_start_iso", "date_end_iso"],
                            "additionalProperties": false
                        }
                    },
                    "required": ["context", "entities", "event_date"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["full_summary", "extracted_snippets"],
        "additionalProperties": false
    })
}

/// Reads the system prompt from `path`, or falls back to the built-in prompt.
pub fn load_system_prompt(path: Option<&Path>) -> Result<String, AppError> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            AppError::Validation(format!(
                "prompt file {} could not be read: {e}",
                path.display()
            ))
        }),
        None => Ok(DEFAULT_SUMMARY_SYSTEM_PROMPT.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn prompt_file_overrides_default() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "custom prompt").expect("write prompt");

        let prompt = load_system_prompt(Some(file.path())).expect("prompt loads");
        assert_eq!(prompt, "custom prompt");
        assert_eq!(
            load_system_prompt(None).expect("default prompt"),
            DEFAULT_SUMMARY_SYSTEM_PROMPT
        );
    }

    #[test]
    fn missing_prompt_file_is_an_error() {
        let result = load_system_prompt(Some(Path::new("/nonexistent/prompt.txt")));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
