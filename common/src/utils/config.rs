use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub notion_api_key: String,
    #[serde(alias = "google_api")]
    pub youtube_api_key: String,
    #[serde(alias = "gemini_api_key")]
    pub llm_api_key: String,
    pub media_db_id: String,
    pub entities_db_id: String,
    pub snippets_db_id: String,
    #[serde(default = "default_notion_base_url")]
    pub notion_base_url: String,
    #[serde(default = "default_notion_version")]
    pub notion_version: String,
    #[serde(default = "default_youtube_base_url")]
    pub youtube_base_url: String,
    #[serde(default = "default_transcript_base_url")]
    pub transcript_base_url: String,
    #[serde(default = "default_transcript_language")]
    pub transcript_language: String,
    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default)]
    pub prompt_file: Option<PathBuf>,
    #[serde(default = "default_video_ids_file")]
    pub video_ids_file: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_notion_base_url() -> String {
    "https://api.notion.com/v1".to_string()
}

fn default_notion_version() -> String {
    "2025-09-03".to_string()
}

fn default_youtube_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_transcript_base_url() -> String {
    "https://www.youtube.com/api/timedtext".to_string()
}

fn default_transcript_language() -> String {
    "en".to_string()
}

fn default_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
}

fn default_llm_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_video_ids_file() -> PathBuf {
    PathBuf::from("youtube_ids.json")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output_data")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("myapp.log")
}

impl AppConfig {
    /// Rejects blank credentials and database ids; `config` only catches absent keys.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("notion_api_key", &self.notion_api_key),
            ("youtube_api_key", &self.youtube_api_key),
            ("llm_api_key", &self.llm_api_key),
            ("media_db_id", &self.media_db_id),
            ("entities_db_id", &self.entities_db_id),
            ("snippets_db_id", &self.snippets_db_id),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Message(format!(
                    "{key} is set but empty; a value is required"
                )));
            }
        }

        Ok(())
    }
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    parse_config(config)
}

pub fn parse_config(config: Config) -> Result<AppConfig, ConfigError> {
    let app_config: AppConfig = config.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}
