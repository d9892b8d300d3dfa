use std::sync::Arc;

use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use common::{error::AppError, utils::config::AppConfig};

use crate::{
    sources::{LlmSummarizer, YoutubeClient},
    types::{SummaryResponse, VideoMetadata},
    utils::llm_instructions::load_system_prompt,
};

/// Upstream collaborators of the batch: the video platform and the summarizer.
#[async_trait]
pub trait PipelineServices: Send + Sync {
    async fn extract_video(&self, video_id: &str) -> Result<VideoMetadata, AppError>;

    async fn summarize(&self, video: &VideoMetadata) -> Result<SummaryResponse, AppError>;
}

pub struct DefaultPipelineServices {
    youtube: YoutubeClient,
    summarizer: LlmSummarizer,
}

impl DefaultPipelineServices {
    pub fn new(youtube: YoutubeClient, summarizer: LlmSummarizer) -> Self {
        Self {
            youtube,
            summarizer,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let system_prompt = load_system_prompt(config.prompt_file.as_deref())?;
        let openai_client = Arc::new(Client::with_config(
            OpenAIConfig::new()
                .with_api_key(&config.llm_api_key)
                .with_api_base(&config.llm_base_url),
        ));

        Ok(Self::new(
            YoutubeClient::from_config(reqwest::Client::new(), config),
            LlmSummarizer::new(openai_client, &config.llm_model, system_prompt),
        ))
    }
}

#[async_trait]
impl PipelineServices for DefaultPipelineServices {
    async fn extract_video(&self, video_id: &str) -> Result<VideoMetadata, AppError> {
        self.youtube.extract(video_id).await
    }

    async fn summarize(&self, video: &VideoMetadata) -> Result<SummaryResponse, AppError> {
        self.summarizer.summarize(video).await
    }
}
