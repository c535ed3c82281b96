// src/handlers/statistics.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::statistics::{PaperReport, QuestionAnalysis, StudentReport},
    services::aggregation,
    state::AppState,
};

/// Answer statistics, score distribution and per-question breakdown of a paper.
/// Teacher only.
pub async fn paper_report(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let paper = state
        .catalog
        .find_paper(id)
        .await?
        .ok_or(AppError::NotFound("Paper not found".to_string()))?;

    let questions = state.catalog.questions_for_paper(id).await?;
    let answers = state.responses.answers_for_paper(id, None).await?;
    // Newest first, so the latest attempt sets the histogram scale.
    let records = state.responses.exam_records_for_paper(id).await?;

    let questions = aggregation::question_breakdown(&questions, &answers)
        .into_iter()
        .map(|mut analysis| {
            analysis.statistics = analysis.statistics.rounded();
            analysis
        })
        .collect();

    Ok(Json(PaperReport {
        paper_id: paper.id,
        paper_name: paper.name,
        exam_count: records.len(),
        answers: aggregation::paper_statistics(&answers).rounded(),
        score_distribution: aggregation::score_histogram(&records).into(),
        questions,
    }))
}

/// Accuracy and most common wrong answers for one question of a paper.
/// Teacher only.
pub async fn question_report(
    State(state): State<AppState>,
    Path((paper_id, question_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    state
        .catalog
        .find_paper(paper_id)
        .await?
        .ok_or(AppError::NotFound("Paper not found".to_string()))?;

    let question = state
        .catalog
        .questions_for_paper(paper_id)
        .await?
        .into_iter()
        .find(|q| q.question_id == question_id)
        .ok_or(AppError::NotFound("Question is not on this paper".to_string()))?;

    let answers = state
        .responses
        .answers_for_paper(paper_id, Some(question_id))
        .await?;

    Ok(Json(QuestionAnalysis {
        question_id,
        question_order: question.question_order,
        content: question.content,
        score: question.score,
        statistics: aggregation::question_statistics(&answers).rounded(),
    }))
}

/// Summary statistics and score trend of one student.
/// A student with no attempts gets an all-zero report.
/// Teacher only.
pub async fn student_report(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let records = state.responses.exam_records_for_student(&student_id).await?;

    Ok(Json(StudentReport {
        statistics: aggregation::student_statistics(&records).rounded(),
        trend: aggregation::student_trend(&records),
        student_id,
    }))
}
