// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    /// The text content of the question (options included for choice questions).
    pub content: String,

    /// The canonical answer. Graded by case- and whitespace-insensitive exact match.
    pub answer: String,

    /// Explanation or analysis of the correct answer.
    pub analysis: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for sending a question to a student (excludes answer and analysis).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub order: i32,
    pub content: String,
    pub score: f64,
}

/// Fields accepted when creating a question.
/// Text is sanitized before it reaches storage.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub content: String,
    pub answer: String,
    pub analysis: Option<String>,
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
    #[validate(length(min = 1, max = 1000))]
    pub answer: String,
    #[validate(length(max = 5000))]
    pub analysis: Option<String>,
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 5000))]
    pub content: Option<String>,
    #[validate(length(min = 1, max = 1000))]
    pub answer: Option<String>,
    #[validate(length(max = 5000))]
    pub analysis: Option<String>,
}

impl UpdateQuestionRequest {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.answer.is_none() && self.analysis.is_none()
    }
}
