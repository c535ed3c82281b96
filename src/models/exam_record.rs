// src/models/exam_record.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::services::grading::QuestionGrade;

/// Whether every question of the paper was answered in the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "exam_status", rename_all = "lowercase")]
pub enum ExamStatus {
    Completed,
    Incomplete,
}

/// Represents the 'exam_records' table in the database.
/// One immutable summary row per submitted attempt.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ExamRecord {
    pub id: i64,
    pub student_id: String,
    pub paper_id: i64,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub submit_time: chrono::DateTime<chrono::Utc>,
    pub total_questions: i32,
    pub answered_questions: i32,
    pub correct_answers: i32,
    pub total_score: f64,
    /// Attainable score captured at submission time.
    pub max_score: f64,
    /// Percentage of answered questions that were correct (0-100).
    pub accuracy_rate: f64,
    pub status: ExamStatus,
}

/// Summary row waiting to be appended to the response store.
#[derive(Debug, Clone)]
pub struct NewExamRecord {
    pub student_id: String,
    pub paper_id: i64,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub submit_time: chrono::DateTime<chrono::Utc>,
    pub total_questions: i32,
    pub answered_questions: i32,
    pub correct_answers: i32,
    pub total_score: f64,
    pub max_score: f64,
    pub accuracy_rate: f64,
    pub status: ExamStatus,
}

/// DTO for submitting a paper attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitExamRequest {
    /// User's answers map.
    /// Key: Question ID (i64)
    /// Value: Raw answer text; blank means unanswered.
    pub answers: HashMap<i64, String>,

    /// When the student opened the paper. Defaults to the submission time.
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO returned after a successful submission.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub record: ExamRecord,
    pub results: Vec<QuestionGrade>,
}
