// src/models/paper.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::{paper_question::PaperQuestionDetail, question::PublicQuestion};

/// Publication lifecycle of a paper. Only published papers accept submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "paper_status", rename_all = "lowercase")]
pub enum PaperStatus {
    Draft,
    Published,
    Archived,
}

/// Represents the 'papers' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Paper {
    pub id: i64,
    pub name: String,
    pub status: PaperStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Paper {
    pub fn accepts_submissions(&self) -> bool {
        self.status == PaperStatus::Published
    }
}

/// Paper listing entry with its question count and attainable score.
#[derive(Debug, Serialize)]
pub struct PaperSummary {
    #[serde(flatten)]
    pub paper: Paper,
    pub question_count: usize,
    pub total_score: f64,
}

/// Full paper view for teachers, questions in paper order.
#[derive(Debug, Serialize)]
pub struct PaperDetail {
    #[serde(flatten)]
    pub paper: Paper,
    pub questions: Vec<PaperQuestionDetail>,
    pub total_questions: usize,
    pub total_score: f64,
}

/// Paper as shown to a student taking it. Answers and analyses are withheld.
#[derive(Debug, Serialize)]
pub struct PublicPaper {
    #[serde(flatten)]
    pub paper: Paper,
    pub questions: Vec<PublicQuestion>,
    pub total_questions: usize,
    pub total_score: f64,
}

/// Query parameters for listing papers.
#[derive(Debug, Deserialize)]
pub struct PaperListParams {
    pub status: Option<PaperStatus>,
}

/// DTO for creating a paper. New papers always start as drafts.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaperRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

/// DTO for updating a paper. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePaperRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub status: Option<PaperStatus>,
}
