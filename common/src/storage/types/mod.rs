pub mod block;
pub mod filter;
pub mod property;

use serde::{Deserialize, Serialize};

/// Location a new record is created under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub data_source_id: String,
}

impl ParentRef {
    pub fn data_source(id: impl Into<String>) -> Self {
        Self {
            data_source_id: id.into(),
        }
    }
}

impl Serialize for ParentRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serde_json::json!({
            "type": "data_source_id",
            "data_source_id": self.data_source_id,
        })
        .serialize(serializer)
    }
}

/// A record as returned by the store. Properties are kept in the store's raw shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredRecord {
    pub id: String,
    #[serde(default)]
    pub properties: serde_json::Value,
}
