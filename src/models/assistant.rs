// src/models/assistant.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of a chat conversation. The client keeps the history.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatMessage {
    pub role: ChatRole,
    #[validate(length(min = 1, max = 4000))]
    pub content: String,
}

/// DTO for a chat turn.
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[serde(default)]
    #[validate(nested)]
    pub history: Vec<ChatMessage>,
    #[validate(length(min = 1, max = 4000))]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    /// False when the reply is the canned fallback.
    pub from_model: bool,
}

/// DTO describing the questions a teacher wants generated.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateQuestionsRequest {
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[validate(length(min = 1, max = 100))]
    pub grade: String,
    #[validate(length(min = 1, max = 100))]
    pub question_type: String,
    #[validate(range(min = 1, max = 20))]
    pub num_questions: u32,
    #[validate(length(min = 1, max = 2000))]
    pub knowledge_points: String,
}

/// A question proposed by the language model, before it is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub content: String,
    pub answer: String,
    pub analysis: Option<String>,
}
