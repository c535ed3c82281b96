// src/models/answer.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'answers' table: one student's graded response to one question.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Answer {
    pub id: i64,
    pub student_id: String,
    pub paper_id: i64,
    pub question_id: i64,
    /// Raw text exactly as submitted.
    pub student_answer: String,
    pub is_correct: bool,
    pub score: f64,
    pub answered_at: chrono::DateTime<chrono::Utc>,
}

/// A graded answer waiting to be appended to the response store.
#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub student_id: String,
    pub paper_id: i64,
    pub question_id: i64,
    pub student_answer: String,
    pub is_correct: bool,
    pub score: f64,
}
