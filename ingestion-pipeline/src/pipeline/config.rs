use std::path::PathBuf;

use common::utils::config::AppConfig;

use crate::utils::chunking::SUMMARY_CHUNK_CHARS;

/// Ids of the data sources records are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub media: String,
    pub entities: String,
    pub snippets: String,
}

impl DataSources {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            media: config.media_db_id.clone(),
            entities: config.entities_db_id.clone(),
            snippets: config.snippets_db_id.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestionConfig {
    pub summary_chunk_chars: usize,
    pub backup_dir: PathBuf,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            summary_chunk_chars: SUMMARY_CHUNK_CHARS,
            backup_dir: PathBuf::from("output_data"),
        }
    }
}

impl IngestionConfig {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            backup_dir: config.output_dir.clone(),
            ..Self::default()
        }
    }
}
