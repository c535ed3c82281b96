// src/handlers/exam.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    models::{
        exam_record::{SubmissionResponse, SubmitExamRequest},
        paper::{PaperStatus, PublicPaper},
        question::PublicQuestion,
    },
    services::{aggregation, submission::submit_attempt},
    state::AppState,
    utils::jwt::Claims,
};

/// Lists the papers currently open for submissions.
pub async fn list_papers(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let papers = state
        .catalog
        .list_papers(Some(PaperStatus::Published))
        .await?;

    Ok(Json(papers))
}

/// Returns a published paper with its questions, without answers or analyses.
/// Draft and archived papers are reported as missing.
pub async fn get_paper(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let paper = state
        .catalog
        .find_paper(id)
        .await?
        .filter(|paper| paper.accepts_submissions())
        .ok_or(AppError::NotFound("Paper not found".to_string()))?;

    let questions: Vec<PublicQuestion> = state
        .catalog
        .questions_for_paper(id)
        .await?
        .into_iter()
        .map(|q| PublicQuestion {
            id: q.question_id,
            order: q.question_order,
            content: q.content,
            score: q.score,
        })
        .collect();

    let total_score = questions.iter().map(|q| q.score).sum();

    Ok(Json(PublicPaper {
        paper,
        total_questions: questions.len(),
        total_score,
        questions,
    }))
}

/// Grades and stores an attempt for the calling user.
///
/// Keys of `answers` are question IDs; blank answers count as unanswered.
/// Returns 201 with the exam record and the grade of every answered question.
pub async fn submit_paper(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<SubmitExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = submit_attempt(
        state.catalog.as_ref(),
        state.responses.as_ref(),
        claims.student_id(),
        id,
        &payload.answers,
        payload.started_at,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse {
            record: outcome.record,
            results: outcome.results,
        }),
    ))
}

/// The caller's graded answers for one paper, newest first.
pub async fn my_answers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let answers = state
        .responses
        .answers_for_student(claims.student_id(), Some(id))
        .await?;

    Ok(Json(answers))
}

/// The caller's exam history with summary statistics and score trend.
pub async fn my_records(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let records = state
        .responses
        .exam_records_for_student(claims.student_id())
        .await?;

    let statistics = aggregation::student_statistics(&records).rounded();
    let trend = aggregation::student_trend(&records);

    Ok(Json(json!({
        "records": records,
        "statistics": statistics,
        "trend": trend
    })))
}
