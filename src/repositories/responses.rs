// src/repositories/responses.rs

use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool};

use crate::{
    error::AppError,
    models::{
        answer::{Answer, NewAnswer},
        exam_record::{ExamRecord, NewExamRecord},
    },
};

const ANSWER_COLUMNS: &str =
    "id, student_id, paper_id, question_id, student_answer, is_correct, score, answered_at";
const RECORD_COLUMNS: &str = "id, student_id, paper_id, start_time, submit_time, total_questions, \
    answered_questions, correct_answers, total_score, max_score, accuracy_rate, status";

/// Append-only log of graded answers and exam summaries.
#[async_trait]
pub trait ResponseRepository: Send + Sync {
    async fn append_answer(&self, answer: &NewAnswer) -> Result<Answer, AppError>;
    async fn append_exam_record(&self, record: &NewExamRecord) -> Result<ExamRecord, AppError>;

    /// Stores one attempt. Stores that support it write the rows as one unit.
    async fn record_attempt(
        &self,
        answers: &[NewAnswer],
        record: &NewExamRecord,
    ) -> Result<ExamRecord, AppError> {
        for answer in answers {
            self.append_answer(answer).await?;
        }
        self.append_exam_record(record).await
    }

    /// Newest first. Narrowed to one question when `question_id` is given.
    async fn answers_for_paper(
        &self,
        paper_id: i64,
        question_id: Option<i64>,
    ) -> Result<Vec<Answer>, AppError>;
    async fn answers_for_student(
        &self,
        student_id: &str,
        paper_id: Option<i64>,
    ) -> Result<Vec<Answer>, AppError>;
    /// Newest submission first.
    async fn exam_records_for_student(&self, student_id: &str) -> Result<Vec<ExamRecord>, AppError>;
    /// Newest submission first.
    async fn exam_records_for_paper(&self, paper_id: i64) -> Result<Vec<ExamRecord>, AppError>;
}

pub struct PgResponseRepository {
    pool: PgPool,
}

impl PgResponseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert_answer<'e, E: PgExecutor<'e>>(
    executor: E,
    answer: &NewAnswer,
) -> Result<Answer, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "INSERT INTO answers (student_id, paper_id, question_id, student_answer, is_correct, score)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {ANSWER_COLUMNS}"
    ))
    .bind(&answer.student_id)
    .bind(answer.paper_id)
    .bind(answer.question_id)
    .bind(&answer.student_answer)
    .bind(answer.is_correct)
    .bind(answer.score)
    .fetch_one(executor)
    .await
}

async fn insert_exam_record<'e, E: PgExecutor<'e>>(
    executor: E,
    record: &NewExamRecord,
) -> Result<ExamRecord, sqlx::Error> {
    sqlx::query_as::<_, ExamRecord>(&format!(
        "INSERT INTO exam_records
         (student_id, paper_id, start_time, submit_time, total_questions, answered_questions,
          correct_answers, total_score, max_score, accuracy_rate, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         RETURNING {RECORD_COLUMNS}"
    ))
    .bind(&record.student_id)
    .bind(record.paper_id)
    .bind(record.start_time)
    .bind(record.submit_time)
    .bind(record.total_questions)
    .bind(record.answered_questions)
    .bind(record.correct_answers)
    .bind(record.total_score)
    .bind(record.max_score)
    .bind(record.accuracy_rate)
    .bind(record.status)
    .fetch_one(executor)
    .await
}

#[async_trait]
impl ResponseRepository for PgResponseRepository {
    // Single-row writes outside an attempt; `record_attempt` uses the same
    // inserts inside one transaction.
    async fn append_answer(&self, answer: &NewAnswer) -> Result<Answer, AppError> {
        Ok(insert_answer(&self.pool, answer).await?)
    }

    async fn append_exam_record(&self, record: &NewExamRecord) -> Result<ExamRecord, AppError> {
        Ok(insert_exam_record(&self.pool, record).await?)
    }

    async fn record_attempt(
        &self,
        answers: &[NewAnswer],
        record: &NewExamRecord,
    ) -> Result<ExamRecord, AppError> {
        let mut tx = self.pool.begin().await?;

        for answer in answers {
            insert_answer(&mut *tx, answer).await.map_err(|e| {
                tracing::error!("Failed to insert answer: {:?}", e);
                AppError::from(e)
            })?;
        }

        let saved = insert_exam_record(&mut *tx, record).await.map_err(|e| {
            tracing::error!("Failed to insert exam record: {:?}", e);
            AppError::from(e)
        })?;

        tx.commit().await?;
        Ok(saved)
    }

    async fn answers_for_paper(
        &self,
        paper_id: i64,
        question_id: Option<i64>,
    ) -> Result<Vec<Answer>, AppError> {
        let answers = sqlx::query_as::<_, Answer>(&format!(
            "SELECT {ANSWER_COLUMNS} FROM answers
             WHERE paper_id = $1 AND ($2::BIGINT IS NULL OR question_id = $2)
             ORDER BY answered_at DESC, id DESC"
        ))
        .bind(paper_id)
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(answers)
    }

    async fn answers_for_student(
        &self,
        student_id: &str,
        paper_id: Option<i64>,
    ) -> Result<Vec<Answer>, AppError> {
        let answers = sqlx::query_as::<_, Answer>(&format!(
            "SELECT {ANSWER_COLUMNS} FROM answers
             WHERE student_id = $1 AND ($2::BIGINT IS NULL OR paper_id = $2)
             ORDER BY answered_at DESC, id DESC"
        ))
        .bind(student_id)
        .bind(paper_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(answers)
    }

    async fn exam_records_for_student(&self, student_id: &str) -> Result<Vec<ExamRecord>, AppError> {
        let records = sqlx::query_as::<_, ExamRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM exam_records
             WHERE student_id = $1
             ORDER BY submit_time DESC, id DESC"
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn exam_records_for_paper(&self, paper_id: i64) -> Result<Vec<ExamRecord>, AppError> {
        let records = sqlx::query_as::<_, ExamRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM exam_records
             WHERE paper_id = $1
             ORDER BY submit_time DESC, id DESC"
        ))
        .bind(paper_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
