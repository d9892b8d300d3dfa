use std::sync::Arc;

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, ResponseFormat,
        ResponseFormatJsonSchema,
    },
    Client,
};
use common::error::AppError;
use tracing::{debug, info};

use crate::{
    types::{SummaryResponse, VideoMetadata},
    utils::llm_instructions::get_summary_schema,
};

/// Summarizes a video through an OpenAI-compatible chat completion endpoint.
pub struct LlmSummarizer {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    system_prompt: String,
}

impl LlmSummarizer {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: &str, system_prompt: String) -> Self {
        Self {
            client,
            model: model.to_string(),
            system_prompt,
        }
    }

    pub async fn summarize(&self, video: &VideoMetadata) -> Result<SummaryResponse, AppError> {
        info!(video_id = %video.video_id, model = %self.model, "requesting summary");
        let request = self.prepare_request(video)?;
        let summary = self.perform_summary(request).await?;
        info!(
            video_id = %video.video_id,
            summary_chars = summary.full_summary.chars().count(),
            snippets = summary.extracted_snippets.len(),
            "summary received"
        );
        Ok(summary)
    }

    fn prepare_request(&self, video: &VideoMetadata) -> Result<CreateChatCompletionRequest, AppError> {
        let user_message = format!("DATA TO PROCESS:\n\n{}", format_video_content(video));

        debug!(chars = user_message.chars().count(), "prepared summary request");

        let response_format = ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: Some("Summary and extracted snippets of a video transcript".into()),
                name: "video_summary".into(),
                schema: Some(get_summary_schema()),
                strict: Some(true),
            },
        };

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestSystemMessage::from(self.system_prompt.as_str()).into(),
                ChatCompletionRequestUserMessage::from(user_message).into(),
            ])
            .response_format(response_format)
            .build()?;

        Ok(request)
    }

    async fn perform_summary(
        &self,
        request: CreateChatCompletionRequest,
    ) -> Result<SummaryResponse, AppError> {
        let response = self.client.chat().create(request).await?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_ref())
            .ok_or(AppError::LLMParsing(
                "No content found in LLM response".into(),
            ))?;

        parse_summary(content)
    }
}

pub(crate) fn format_video_content(video: &VideoMetadata) -> String {
    let title = if video.title.is_empty() {
        "Unknown Title"
    } else {
        video.title.as_str()
    };
    let description = if video.description.is_empty() {
        "No description provided."
    } else {
        video.description.as_str()
    };

    format!(
        "VIDEO TITLE: {title}\n\nVIDEO DESCRIPTION & SOURCES:\n{description}\n\nTRANSCRIPT CONTENT:\n{}",
        video.transcript.join("\n")
    )
}

fn parse_summary(content: &str) -> Result<SummaryResponse, AppError> {
    serde_json::from_str::<SummaryResponse>(content).map_err(|e| {
        AppError::LLMParsing(format!("Failed to parse LLM response into summary: {e}"))
    })
}
