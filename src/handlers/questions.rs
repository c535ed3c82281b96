// src/handlers/questions.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::question::{CreateQuestionRequest, NewQuestion, UpdateQuestionRequest},
    state::AppState,
    utils::html::{clean_html, clean_optional},
};

/// Adds a question to the bank.
/// Teacher only.
pub async fn create_question(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    // The answer is compared verbatim during grading, so only display text is sanitized.
    let question = NewQuestion {
        content: clean_html(&payload.content),
        answer: payload.answer.trim().to_string(),
        analysis: clean_optional(payload.analysis.as_deref()),
    };

    if question.content.trim().is_empty() || question.answer.is_empty() {
        return Err(AppError::BadRequest(
            "Question content and answer must not be empty".to_string(),
        ));
    }

    let question = state.catalog.create_question(&question).await?;
    tracing::info!("Created question {}", question.id);

    Ok((StatusCode::CREATED, Json(question)))
}

/// Lists every question in the bank, newest first.
/// Teacher only.
pub async fn list_questions(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let questions = state.catalog.list_questions().await?;
    Ok(Json(questions))
}

pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let question = state
        .catalog
        .find_question(id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(question))
}

/// Updates a question. Fields are optional.
/// Teacher only.
pub async fn update_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if payload.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    let changes = UpdateQuestionRequest {
        content: payload.content.as_deref().map(clean_html),
        answer: payload.answer.as_deref().map(|a| a.trim().to_string()),
        analysis: payload.analysis.as_deref().map(clean_html),
    };

    if changes.content.as_deref().is_some_and(|c| c.trim().is_empty())
        || changes.answer.as_deref().is_some_and(str::is_empty)
    {
        return Err(AppError::BadRequest(
            "Question content and answer must not be empty".to_string(),
        ));
    }

    let question = state
        .catalog
        .update_question(id, &changes)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    tracing::info!("Updated question {}", id);

    Ok(Json(question))
}

/// Deletes a question and detaches it from every paper.
/// Answers already given to it stay in the history.
/// Teacher only.
pub async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !state.catalog.delete_question(id).await? {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    tracing::info!("Deleted question {}", id);

    Ok(StatusCode::NO_CONTENT)
}
