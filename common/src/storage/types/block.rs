use serde::{Serialize, Serializer};
use serde_json::json;

/// Body content attached to a record on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Code { content: String, language: String },
}

impl Block {
    pub fn markdown(content: impl Into<String>) -> Self {
        Self::Code {
            content: content.into(),
            language: "markdown".to_string(),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Code { content, .. } => content,
        }
    }
}

impl Serialize for Block {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Code { content, language } => json!({
                "object": "block",
                "type": "code",
                "code": {
                    "rich_text": [{ "type": "text", "text": { "content": content } }],
                    "language": language,
                },
            })
            .serialize(serializer),
        }
    }
}
