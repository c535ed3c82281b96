// src/handlers/papers.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    config::DEFAULT_QUESTION_SCORE,
    error::AppError,
    models::{
        paper::{
            CreatePaperRequest, Paper, PaperDetail, PaperListParams, PaperStatus,
            UpdatePaperRequest,
        },
        paper_question::{AddPaperQuestionRequest, UpdatePaperQuestionRequest},
    },
    state::AppState,
};

async fn find_paper_or_404(state: &AppState, id: i64) -> Result<Paper, AppError> {
    state
        .catalog
        .find_paper(id)
        .await?
        .ok_or(AppError::NotFound("Paper not found".to_string()))
}

/// Loads a paper with its ordered questions and attainable score.
async fn paper_detail(state: &AppState, paper: Paper) -> Result<PaperDetail, AppError> {
    let questions = state.catalog.questions_for_paper(paper.id).await?;
    let total_score = questions.iter().map(|q| q.score).sum();

    Ok(PaperDetail {
        paper,
        total_questions: questions.len(),
        total_score,
        questions,
    })
}

/// Creates an empty draft paper.
/// Teacher only.
pub async fn create_paper(
    State(state): State<AppState>,
    Json(payload): Json<CreatePaperRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Paper name must not be empty".to_string()));
    }

    let paper = state.catalog.create_paper(name).await?;
    tracing::info!("Created paper {} ({})", paper.id, paper.name);

    Ok((StatusCode::CREATED, Json(paper)))
}

/// Lists papers, optionally filtered by `?status=`.
/// Teacher only.
pub async fn list_papers(
    State(state): State<AppState>,
    Query(params): Query<PaperListParams>,
) -> Result<impl IntoResponse, AppError> {
    let papers = state.catalog.list_papers(params.status).await?;
    Ok(Json(papers))
}

pub async fn get_paper(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let paper = find_paper_or_404(&state, id).await?;
    Ok(Json(paper_detail(&state, paper).await?))
}

/// Renames a paper and/or changes its status.
/// Teacher only.
pub async fn update_paper(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePaperRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if payload.name.is_none() && payload.status.is_none() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    let name = payload.name.as_deref().map(str::trim);
    if name.is_some_and(str::is_empty) {
        return Err(AppError::BadRequest("Paper name must not be empty".to_string()));
    }

    let paper = state
        .catalog
        .update_paper(id, name, payload.status)
        .await?
        .ok_or(AppError::NotFound("Paper not found".to_string()))?;

    tracing::info!("Updated paper {}", id);

    Ok(Json(paper))
}

/// Deletes a paper together with its associations, answers and exam records.
/// Teacher only.
pub async fn delete_paper(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !state.catalog.delete_paper(id).await? {
        return Err(AppError::NotFound("Paper not found".to_string()));
    }

    tracing::info!("Deleted paper {}", id);

    Ok(StatusCode::NO_CONTENT)
}

async fn set_status(state: &AppState, id: i64, status: PaperStatus) -> Result<Paper, AppError> {
    let paper = state
        .catalog
        .update_paper(id, None, Some(status))
        .await?
        .ok_or(AppError::NotFound("Paper not found".to_string()))?;

    tracing::info!("Paper {} is now {:?}", id, status);
    Ok(paper)
}

pub async fn publish_paper(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(set_status(&state, id, PaperStatus::Published).await?))
}

/// Withdraws a paper back to draft.
pub async fn unpublish_paper(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(set_status(&state, id, PaperStatus::Draft).await?))
}

pub async fn archive_paper(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(set_status(&state, id, PaperStatus::Archived).await?))
}

/// Attaches a bank question to the end of a paper.
///
/// * The score defaults to `DEFAULT_QUESTION_SCORE`.
/// * Attaching the same question twice returns 409 Conflict.
pub async fn add_question(
    State(state): State<AppState>,
    Path(paper_id): Path<i64>,
    Json(payload): Json<AddPaperQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    find_paper_or_404(&state, paper_id).await?;

    state
        .catalog
        .find_question(payload.question_id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    let association = state
        .catalog
        .add_question_to_paper(
            paper_id,
            payload.question_id,
            payload.score.unwrap_or(DEFAULT_QUESTION_SCORE),
        )
        .await?;

    tracing::info!(
        "Attached question {} to paper {} at position {}",
        association.question_id,
        paper_id,
        association.question_order
    );

    Ok((StatusCode::CREATED, Json(association)))
}

/// Changes the position and/or weight of an attached question.
pub async fn update_question(
    State(state): State<AppState>,
    Path((paper_id, question_id)): Path<(i64, i64)>,
    Json(payload): Json<UpdatePaperQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let association = state
        .catalog
        .update_paper_question(paper_id, question_id, payload.question_order, payload.score)
        .await?
        .ok_or(AppError::NotFound("Question is not on this paper".to_string()))?;

    Ok(Json(association))
}

pub async fn remove_question(
    State(state): State<AppState>,
    Path((paper_id, question_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    if !state
        .catalog
        .remove_question_from_paper(paper_id, question_id)
        .await?
    {
        return Err(AppError::NotFound("Question is not on this paper".to_string()));
    }

    tracing::info!("Detached question {} from paper {}", question_id, paper_id);

    Ok(StatusCode::NO_CONTENT)
}
