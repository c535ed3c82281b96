// src/models/paper_question.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::services::grading::GradingItem;

/// Represents the 'paper_questions' association table.
/// Ordering and score weight belong to the association, so one question can
/// carry different weights on different papers.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PaperQuestion {
    pub id: i64,
    pub paper_id: i64,
    pub question_id: i64,
    /// 1-based position within the paper.
    pub question_order: i32,
    pub score: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// An association joined with its question, as read by the grading workflow.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaperQuestionDetail {
    pub question_id: i64,
    pub question_order: i32,
    pub score: f64,
    pub content: String,
    pub answer: String,
    pub analysis: Option<String>,
}

impl PaperQuestionDetail {
    pub fn grading_item(&self) -> GradingItem {
        GradingItem {
            question_id: self.question_id,
            canonical_answer: self.answer.clone(),
            score_weight: self.score,
        }
    }
}

/// DTO for attaching a question to a paper.
#[derive(Debug, Deserialize, Validate)]
pub struct AddPaperQuestionRequest {
    pub question_id: i64,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub score: Option<f64>,
}

/// DTO for re-ordering or re-weighting an attached question.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePaperQuestionRequest {
    #[validate(range(min = 1))]
    pub question_order: Option<i32>,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub score: Option<f64>,
}
