// src/handlers/assistant.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        assistant::{ChatRequest, GenerateQuestionsRequest},
        question::NewQuestion,
    },
    services::assistant::chat_or_fallback,
    state::AppState,
    utils::html::{clean_html, clean_optional},
};

/// Asks the language model for questions and saves them to the bank.
///
/// Returns 201 with the stored questions, 503 when no model is configured,
/// or 502 when the model reply cannot be used.
pub async fn generate_questions(
    State(state): State<AppState>,
    Json(payload): Json<GenerateQuestionsRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let generated = state.assistant.generate_questions(&payload).await?;

    let mut saved = Vec::with_capacity(generated.len());
    for item in generated {
        let question = NewQuestion {
            content: clean_html(&item.content),
            answer: item.answer,
            analysis: clean_optional(item.analysis.as_deref()),
        };
        if question.content.trim().is_empty() {
            continue;
        }
        saved.push(state.catalog.create_question(&question).await?);
    }

    tracing::info!(
        "Generated {} {} questions for {}",
        saved.len(),
        payload.question_type,
        payload.subject
    );

    Ok((StatusCode::CREATED, Json(saved)))
}

/// One turn with the course assistant. Never fails because of the model.
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let response = chat_or_fallback(state.assistant.as_ref(), &payload.history, &payload.message).await;

    Ok(Json(response))
}
