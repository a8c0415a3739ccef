//! Chat screen backed by a hosted text-generation API

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::ChatCompletionClient;

use crate::models::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// One blocking request-response completion per call
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Produce the assistant reply for the transcript
    ///
    /// The transcript holds user and assistant turns only; the implementation
    /// supplies the system prompt.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ChatCompletion` on any failure of the external call
    async fn complete(&self, transcript: &[ChatMessage]) -> Result<String, AppError>;
}
