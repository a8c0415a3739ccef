use async_trait::async_trait;
use serde::Deserialize;

use super::{ChatMessage, ChatService};
use crate::models::AppError;
use crate::settings::ChatSettings;
use crate::utils::logging::LoggingHelper;

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint
#[derive(Clone)]
pub struct ChatCompletionClient {
    http_client: reqwest::Client,
    api_base_url: String,
    api_key: Option<String>,
    model: String,
    system_prompt: String,
}

impl ChatCompletionClient {
    #[must_use]
    pub fn new(
        api_base_url: &str,
        api_key: Option<String>,
        model: &str,
        system_prompt: &str,
    ) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
            system_prompt: system_prompt.to_string(),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &ChatSettings) -> Self {
        Self::new(
            &settings.api_base_url,
            settings.get_api_key(),
            &settings.model,
            &settings.system_prompt,
        )
    }

    /// System prompt followed by the full transcript
    fn request_messages(&self, transcript: &[ChatMessage]) -> Vec<ChatMessage> {
        std::iter::once(ChatMessage::system(self.system_prompt.clone()))
            .chain(transcript.iter().cloned())
            .collect()
    }
}

#[async_trait]
impl ChatService for ChatCompletionClient {
    async fn complete(&self, transcript: &[ChatMessage]) -> Result<String, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::ChatCompletion("no API key configured".to_string()))?;

        let body = serde_json::json!({
            "model": self.model,
            "messages": self.request_messages(transcript),
        });

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.api_base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ChatCompletion(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(AppError::ChatCompletion(format!(
                "HTTP {}: {body_text}",
                status.as_u16()
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::ChatCompletion(format!("invalid completion body: {e}")))?;

        let reply = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::ChatCompletion("completion has no content".to_string()))?;

        LoggingHelper::log_chat_completion(&self.model, transcript.len(), reply.len());
        Ok(reply)
    }
}
