// src/repositories/catalog.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::AppError,
    models::{
        paper::{Paper, PaperStatus, PaperSummary},
        paper_question::{PaperQuestion, PaperQuestionDetail},
        question::{NewQuestion, Question, UpdateQuestionRequest},
    },
    repositories::is_unique_violation,
};

const QUESTION_COLUMNS: &str = "id, content, answer, analysis, created_at, updated_at";
const PAPER_COLUMNS: &str = "id, name, status, created_at, updated_at";
const PAPER_QUESTION_COLUMNS: &str = "id, paper_id, question_id, question_order, score, created_at";

/// Question bank, papers, and the weighted association between them.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn create_question(&self, question: &NewQuestion) -> Result<Question, AppError>;
    async fn list_questions(&self) -> Result<Vec<Question>, AppError>;
    async fn find_question(&self, id: i64) -> Result<Option<Question>, AppError>;
    /// Returns `None` when the question does not exist.
    async fn update_question(
        &self,
        id: i64,
        changes: &UpdateQuestionRequest,
    ) -> Result<Option<Question>, AppError>;
    async fn delete_question(&self, id: i64) -> Result<bool, AppError>;

    async fn create_paper(&self, name: &str) -> Result<Paper, AppError>;
    /// Newest first, with question count and attainable score.
    async fn list_papers(&self, status: Option<PaperStatus>) -> Result<Vec<PaperSummary>, AppError>;
    async fn find_paper(&self, id: i64) -> Result<Option<Paper>, AppError>;
    async fn update_paper(
        &self,
        id: i64,
        name: Option<&str>,
        status: Option<PaperStatus>,
    ) -> Result<Option<Paper>, AppError>;
    /// Associations, answers and exam records go with the paper.
    async fn delete_paper(&self, id: i64) -> Result<bool, AppError>;

    /// Appends the question at position `count + 1`. Fails with `Conflict` if already attached.
    async fn add_question_to_paper(
        &self,
        paper_id: i64,
        question_id: i64,
        score: f64,
    ) -> Result<PaperQuestion, AppError>;
    async fn remove_question_from_paper(&self, paper_id: i64, question_id: i64) -> Result<bool, AppError>;
    async fn update_paper_question(
        &self,
        paper_id: i64,
        question_id: i64,
        question_order: Option<i32>,
        score: Option<f64>,
    ) -> Result<Option<PaperQuestion>, AppError>;
    /// The paper's questions with canonical answers and weights, in paper order.
    async fn questions_for_paper(&self, paper_id: i64) -> Result<Vec<PaperQuestionDetail>, AppError>;
}

pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_paper_question(
        &self,
        paper_id: i64,
        question_id: i64,
    ) -> Result<Option<PaperQuestion>, AppError> {
        let row = sqlx::query_as::<_, PaperQuestion>(&format!(
            "SELECT {PAPER_QUESTION_COLUMNS} FROM paper_questions
             WHERE paper_id = $1 AND question_id = $2"
        ))
        .bind(paper_id)
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

#[derive(sqlx::FromRow)]
struct PaperSummaryRow {
    id: i64,
    name: String,
    status: PaperStatus,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    question_count: i64,
    total_score: f64,
}

impl From<PaperSummaryRow> for PaperSummary {
    fn from(row: PaperSummaryRow) -> Self {
        PaperSummary {
            paper: Paper {
                id: row.id,
                name: row.name,
                status: row.status,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            question_count: row.question_count as usize,
            total_score: row.total_score,
        }
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn create_question(&self, question: &NewQuestion) -> Result<Question, AppError> {
        let created = sqlx::query_as::<_, Question>(&format!(
            "INSERT INTO questions (content, answer, analysis)
             VALUES ($1, $2, $3)
             RETURNING {QUESTION_COLUMNS}"
        ))
        .bind(&question.content)
        .bind(&question.answer)
        .bind(&question.analysis)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create question: {:?}", e);
            AppError::from(e)
        })?;

        Ok(created)
    }

    async fn list_questions(&self) -> Result<Vec<Question>, AppError> {
        let questions = sqlx::query_as::<_, Question>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    async fn find_question(&self, id: i64) -> Result<Option<Question>, AppError> {
        let question = sqlx::query_as::<_, Question>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(question)
    }

    async fn update_question(
        &self,
        id: i64,
        changes: &UpdateQuestionRequest,
    ) -> Result<Option<Question>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE questions SET updated_at = CURRENT_TIMESTAMP");

        if let Some(content) = &changes.content {
            builder.push(", content = ");
            builder.push_bind(content.clone());
        }

        if let Some(answer) = &changes.answer {
            builder.push(", answer = ");
            builder.push_bind(answer.clone());
        }

        if let Some(analysis) = &changes.analysis {
            builder.push(", analysis = ");
            builder.push_bind(analysis.clone());
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(format!(" RETURNING {QUESTION_COLUMNS}"));

        let updated = builder
            .build_query_as::<Question>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update question: {:?}", e);
                AppError::from(e)
            })?;

        Ok(updated)
    }

    async fn delete_question(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete question: {:?}", e);
                AppError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_paper(&self, name: &str) -> Result<Paper, AppError> {
        let paper = sqlx::query_as::<_, Paper>(&format!(
            "INSERT INTO papers (name, status) VALUES ($1, $2) RETURNING {PAPER_COLUMNS}"
        ))
        .bind(name)
        .bind(PaperStatus::Draft)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create paper: {:?}", e);
            AppError::from(e)
        })?;

        Ok(paper)
    }

    async fn list_papers(&self, status: Option<PaperStatus>) -> Result<Vec<PaperSummary>, AppError> {
        let rows = sqlx::query_as::<_, PaperSummaryRow>(
            "SELECT p.id, p.name, p.status, p.created_at, p.updated_at,
                    COUNT(pq.id) AS question_count,
                    COALESCE(SUM(pq.score), 0)::FLOAT8 AS total_score
             FROM papers p
             LEFT JOIN paper_questions pq ON pq.paper_id = p.id
             WHERE ($1::paper_status IS NULL OR p.status = $1)
             GROUP BY p.id
             ORDER BY p.created_at DESC, p.id DESC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PaperSummary::from).collect())
    }

    async fn find_paper(&self, id: i64) -> Result<Option<Paper>, AppError> {
        let paper = sqlx::query_as::<_, Paper>(&format!(
            "SELECT {PAPER_COLUMNS} FROM papers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(paper)
    }

    async fn update_paper(
        &self,
        id: i64,
        name: Option<&str>,
        status: Option<PaperStatus>,
    ) -> Result<Option<Paper>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE papers SET updated_at = CURRENT_TIMESTAMP");

        if let Some(name) = name {
            builder.push(", name = ");
            builder.push_bind(name.to_string());
        }

        if let Some(status) = status {
            builder.push(", status = ");
            builder.push_bind(status);
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(format!(" RETURNING {PAPER_COLUMNS}"));

        let paper = builder
            .build_query_as::<Paper>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update paper: {:?}", e);
                AppError::from(e)
            })?;

        Ok(paper)
    }

    async fn delete_paper(&self, id: i64) -> Result<bool, AppError> {
        // paper_questions, answers and exam_records cascade on the foreign key.
        let result = sqlx::query("DELETE FROM papers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete paper: {:?}", e);
                AppError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_question_to_paper(
        &self,
        paper_id: i64,
        question_id: i64,
        score: f64,
    ) -> Result<PaperQuestion, AppError> {
        sqlx::query_as::<_, PaperQuestion>(&format!(
            "INSERT INTO paper_questions (paper_id, question_id, question_order, score)
             SELECT $1, $2, (COUNT(*) + 1)::INTEGER, $3
             FROM paper_questions WHERE paper_id = $1
             RETURNING {PAPER_QUESTION_COLUMNS}"
        ))
        .bind(paper_id)
        .bind(question_id)
        .bind(score)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Question is already on this paper".to_string())
            } else {
                tracing::error!("Failed to add question to paper: {:?}", e);
                AppError::from(e)
            }
        })
    }

    async fn remove_question_from_paper(&self, paper_id: i64, question_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM paper_questions WHERE paper_id = $1 AND question_id = $2")
            .bind(paper_id)
            .bind(question_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to remove question from paper: {:?}", e);
                AppError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_paper_question(
        &self,
        paper_id: i64,
        question_id: i64,
        question_order: Option<i32>,
        score: Option<f64>,
    ) -> Result<Option<PaperQuestion>, AppError> {
        if question_order.is_none() && score.is_none() {
            return self.find_paper_question(paper_id, question_id).await;
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE paper_questions SET ");
        let mut separated = builder.separated(", ");

        if let Some(order) = question_order {
            separated.push("question_order = ");
            separated.push_bind_unseparated(order);
        }

        if let Some(score) = score {
            separated.push("score = ");
            separated.push_bind_unseparated(score);
        }

        builder.push(" WHERE paper_id = ");
        builder.push_bind(paper_id);
        builder.push(" AND question_id = ");
        builder.push_bind(question_id);
        builder.push(format!(" RETURNING {PAPER_QUESTION_COLUMNS}"));

        let row = builder
            .build_query_as::<PaperQuestion>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update paper question: {:?}", e);
                AppError::from(e)
            })?;

        Ok(row)
    }

    async fn questions_for_paper(&self, paper_id: i64) -> Result<Vec<PaperQuestionDetail>, AppError> {
        let rows = sqlx::query_as::<_, PaperQuestionDetail>(
            "SELECT pq.question_id, pq.question_order, pq.score,
                    q.content, q.answer, q.analysis
             FROM paper_questions pq
             JOIN questions q ON q.id = pq.question_id
             WHERE pq.paper_id = $1
             ORDER BY pq.question_order, pq.question_id",
        )
        .bind(paper_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
