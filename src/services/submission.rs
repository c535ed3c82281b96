// src/services/submission.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    models::{
        answer::NewAnswer,
        exam_record::{ExamRecord, ExamStatus, NewExamRecord},
        paper_question::PaperQuestionDetail,
    },
    repositories::{CatalogRepository, ResponseRepository},
    services::grading::{GradingItem, GradingResult, QuestionGrade, grade_submission},
};

/// Result of a stored attempt.
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub record: ExamRecord,
    pub results: Vec<QuestionGrade>,
}

/// Builds the rows to persist for a graded attempt.
/// `max_score` is captured from the paper as it stands now.
pub fn attempt_rows(
    student_id: &str,
    paper_id: i64,
    grading: &GradingResult,
    started_at: DateTime<Utc>,
    submitted_at: DateTime<Utc>,
) -> (Vec<NewAnswer>, NewExamRecord) {
    let answers = grading
        .results
        .iter()
        .map(|grade| NewAnswer {
            student_id: student_id.to_string(),
            paper_id,
            question_id: grade.question_id,
            student_answer: grade.submitted.clone(),
            is_correct: grade.is_correct,
            score: grade.score,
        })
        .collect();

    let record = NewExamRecord {
        student_id: student_id.to_string(),
        paper_id,
        start_time: started_at.min(submitted_at),
        submit_time: submitted_at,
        total_questions: grading.total_questions as i32,
        answered_questions: grading.answered_count as i32,
        correct_answers: grading.correct_count as i32,
        total_score: grading.total_score,
        max_score: grading.max_score,
        accuracy_rate: grading.accuracy_rate(),
        status: if grading.is_complete() {
            ExamStatus::Completed
        } else {
            ExamStatus::Incomplete
        },
    };

    (answers, record)
}

/// Grades and stores a student's attempt at a paper.
///
/// * Rejects unknown and non-published papers.
/// * Rejects attempts with no answered question or with answers to foreign questions.
/// * Writes the answers and the exam record through `record_attempt`.
pub async fn submit_attempt(
    catalog: &dyn CatalogRepository,
    responses: &dyn ResponseRepository,
    student_id: &str,
    paper_id: i64,
    raw_answers: &HashMap<i64, String>,
    started_at: Option<DateTime<Utc>>,
) -> Result<SubmissionOutcome, AppError> {
    let paper = catalog
        .find_paper(paper_id)
        .await?
        .ok_or(AppError::NotFound("Paper not found".to_string()))?;

    if !paper.accepts_submissions() {
        return Err(AppError::BadRequest(
            "Paper is not open for submissions".to_string(),
        ));
    }

    let questions = catalog.questions_for_paper(paper_id).await?;
    let items: Vec<GradingItem> = questions.iter().map(PaperQuestionDetail::grading_item).collect();

    let grading = grade_submission(&items, raw_answers).inspect_err(|rejection| {
        tracing::info!(
            "Rejected submission from student {} on paper {}: {}",
            student_id,
            paper_id,
            rejection
        );
    })?;

    let submitted_at = Utc::now();
    let (answers, record) = attempt_rows(
        student_id,
        paper_id,
        &grading,
        started_at.unwrap_or(submitted_at),
        submitted_at,
    );

    let record = responses.record_attempt(&answers, &record).await?;
    tracing::info!(
        "Student {} submitted paper {}: {}/{} ({} of {} correct)",
        student_id,
        paper_id,
        record.total_score,
        record.max_score,
        record.correct_answers,
        record.answered_questions
    );

    Ok(SubmissionOutcome {
        record,
        results: grading.results,
    })
}
