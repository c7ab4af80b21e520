//! External collaborators: the text and image generation services.
//!
//! The traits abstract the backends so a chat-completion API, a local model
//! or a scripted fake for tests can be plugged into a [`Session`](crate::Session).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use case_rules::CardKind;

use crate::error::GenerationError;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message of a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// What a text request is for. Backends may ignore it; fakes route on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Purpose {
    /// The Mystery card.
    Opening,
    /// Content for an investigable card.
    CardContent(CardKind),
    /// Rate the connection between two cards.
    Rating,
    /// Re-derive an earlier card from a later discovery.
    Regeneration,
    /// The five theories of the Reveal card.
    Theories,
    /// Which theory is false.
    FalseTheory,
    /// The closing narrative.
    Conclusion,
    /// Short visual description used for the image prompt.
    SceneSummary,
}

/// A full chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub purpose: Purpose,
    pub messages: Vec<ChatMessage>,
}

impl GenerationRequest {
    pub fn new(purpose: Purpose, messages: Vec<ChatMessage>) -> Self {
        Self { purpose, messages }
    }

    /// Content of the last user message, if any.
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// Service trait for chat-style text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send the messages and return the reply text.
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}

/// Service trait for image generation.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Render a scene description. Returns an image reference (URL or path).
    async fn render(&self, scene: &str) -> Result<String, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_user_message() {
        let request = GenerationRequest::new(
            Purpose::Rating,
            vec![
                ChatMessage::system("rules"),
                ChatMessage::user("first"),
                ChatMessage::assistant("reply"),
                ChatMessage::user("second"),
            ],
        );
        assert_eq!(request.last_user_message(), Some("second"));
    }

    #[test]
    fn test_no_user_message() {
        let request = GenerationRequest::new(Purpose::Opening, vec![ChatMessage::system("rules")]);
        assert_eq!(request.last_user_message(), None);
    }
}
