//! AI research assistant chat.

use chrono::{DateTime, Utc};

use crate::api::ApiClient;
use crate::error::Error;

pub const GREETING: &str = "Hello! I'm your AI research assistant. I can help you understand research papers, answer questions about academic topics, and provide explanations in simple terms. What would you like to know?";
pub const RATE_LIMITED: &str = "Looks like API rate limit exceeded. Please contact the admin or try again after some time.";
pub const CONNECTION_FAILED: &str = "Sorry, there was an error connecting to the AI service. Please try again.";

/// Starter questions offered under the input box.
pub const QUICK_QUESTIONS: [&str; 6] = [
    "What is machine learning?",
    "Explain quantum computing",
    "How does CRISPR work?",
    "What are neural networks?",
    "Explain the theory of relativity",
    "How do vaccines work?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            sent_at: Utc::now(),
        }
    }
}

/// Chat transcript with the assistant.
#[derive(Debug)]
pub struct AssistantView {
    messages: Vec<ChatMessage>,
}

impl AssistantView {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::new(Role::Assistant, GREETING)],
        }
    }

    /// Send a question and append the reply. Blank input is ignored.
    ///
    /// Failures are answered in the transcript itself rather than returned.
    pub async fn send(&mut self, api: &ApiClient, input: &str) -> bool {
        let question = input.trim();
        if question.is_empty() {
            return false;
        }
        self.messages.push(ChatMessage::new(Role::User, question));

        let reply = match api.answer(question).await {
            Ok(answer) => answer,
            Err(Error::Rejected(reason)) => {
                tracing::warn!(reason = %reason, "Assistant returned no answer");
                RATE_LIMITED.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Assistant request failed");
                CONNECTION_FAILED.to_string()
            }
        };
        self.messages.push(ChatMessage::new(Role::Assistant, reply));
        true
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last_reply(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }
}

impl Default for AssistantView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    #[test]
    fn test_starts_with_greeting() {
        let view = AssistantView::new();
        assert_eq!(view.messages().len(), 1);
        assert_eq!(view.messages()[0].role, Role::Assistant);
        assert_eq!(view.messages()[0].content, GREETING);
    }

    #[tokio::test]
    async fn test_blank_input_ignored() {
        let api = ApiClient::new(&ClientConfig::default()).unwrap();
        let mut view = AssistantView::new();
        assert!(!view.send(&api, "  \n").await);
        assert_eq!(view.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_connection_failure_reply() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let api = ApiClient::new(&ClientConfig::new(format!("http://127.0.0.1:{}", port))).unwrap();
        let mut view = AssistantView::new();

        assert!(view.send(&api, "How do vaccines work?").await);
        assert_eq!(view.messages().len(), 3);
        assert_eq!(view.messages()[1].role, Role::User);
        assert_eq!(view.last_reply().unwrap().content, CONNECTION_FAILED);
    }
}
