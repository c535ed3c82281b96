// src/services/aggregation.rs

//! Reporting reductions over persisted answers and exam records.
//! Every function is a single pass over data already in memory; a zero
//! denominator yields 0 instead of an error.

use std::collections::HashMap;

use crate::{
    config::{HISTOGRAM_BUCKETS, TOP_WRONG_ANSWERS},
    models::{
        answer::Answer,
        exam_record::ExamRecord,
        paper_question::PaperQuestionDetail,
        statistics::{
            PaperStatistics, QuestionAnalysis, QuestionStatistics, ScoreHistogram,
            StudentStatistics, TrendPoint, WrongAnswerCount,
        },
    },
    services::grading::normalize_answer,
};

fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 { 0.0 } else { part / whole * 100.0 }
}

fn mean(total: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { total / count as f64 }
}

/// Answer-level statistics over every answer given on a paper.
pub fn paper_statistics(answers: &[Answer]) -> PaperStatistics {
    let total_answers = answers.len();
    let correct_answers = answers.iter().filter(|a| a.is_correct).count();
    let score_sum: f64 = answers.iter().map(|a| a.score).sum();

    PaperStatistics {
        total_answers,
        correct_answers,
        accuracy_rate: percentage(correct_answers as f64, total_answers as f64),
        average_score: mean(score_sum, total_answers),
    }
}

/// Exam-level statistics over one student's records.
pub fn student_statistics(records: &[ExamRecord]) -> StudentStatistics {
    let total_score: f64 = records.iter().map(|r| r.total_score).sum();
    let best_score = records
        .iter()
        .map(|r| r.total_score)
        .reduce(f64::max)
        .unwrap_or(0.0);

    StudentStatistics {
        total_exams: records.len(),
        average_score: mean(total_score, records.len()),
        total_score,
        best_score,
    }
}

/// Accuracy and the most common wrong answers for one question on one paper.
///
/// Wrong answers are grouped by their normalized text and reported with the
/// first spelling seen. Ties keep first-seen order.
pub fn question_statistics(answers: &[Answer]) -> QuestionStatistics {
    let total_answers = answers.len();
    let correct_answers = answers.iter().filter(|a| a.is_correct).count();

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut wrong: Vec<WrongAnswerCount> = Vec::new();
    for answer in answers.iter().filter(|a| !a.is_correct) {
        let key = normalize_answer(&answer.student_answer);
        match index.get(&key) {
            Some(&pos) => wrong[pos].count += 1,
            None => {
                index.insert(key, wrong.len());
                wrong.push(WrongAnswerCount {
                    answer: answer.student_answer.trim().to_string(),
                    count: 1,
                });
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    wrong.sort_by(|a, b| b.count.cmp(&a.count));
    wrong.truncate(TOP_WRONG_ANSWERS);

    QuestionStatistics {
        total_answers,
        correct_answers,
        accuracy_rate: percentage(correct_answers as f64, total_answers as f64),
        common_wrong_answers: wrong,
    }
}

/// Per-question statistics for every question on a paper, in paper order.
pub fn question_breakdown(
    questions: &[PaperQuestionDetail],
    answers: &[Answer],
) -> Vec<QuestionAnalysis> {
    let mut by_question: HashMap<i64, Vec<Answer>> = HashMap::new();
    for answer in answers {
        by_question
            .entry(answer.question_id)
            .or_default()
            .push(answer.clone());
    }

    questions
        .iter()
        .map(|q| {
            let answers = by_question.remove(&q.question_id).unwrap_or_default();
            QuestionAnalysis {
                question_id: q.question_id,
                question_order: q.question_order,
                content: q.content.clone(),
                score: q.score,
                statistics: question_statistics(&answers),
            }
        })
        .collect()
}

/// Distribution of attempts over ten 10-point bands.
///
/// Scores are normalized against the max score of the first record, so the
/// caller controls which attempt sets the scale. A normalized 100 lands in the
/// last band.
///
/// The paper report passes records newest first, as `exam_records_for_paper`
/// returns them, so the latest attempt sets the scale.
pub fn score_histogram(records: &[ExamRecord]) -> ScoreHistogram {
    let mut buckets = [0usize; HISTOGRAM_BUCKETS];
    let Some(first) = records.first() else {
        return ScoreHistogram { buckets };
    };

    let width = 100.0 / HISTOGRAM_BUCKETS as f64;
    for record in records {
        let normalized = percentage(record.total_score, first.max_score).max(0.0);
        let index = ((normalized / width) as usize).min(HISTOGRAM_BUCKETS - 1);
        buckets[index] += 1;
    }

    ScoreHistogram { buckets }
}

/// A student's results ordered from oldest to newest submission.
pub fn student_trend(records: &[ExamRecord]) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = records
        .iter()
        .map(|r| TrendPoint {
            record_id: r.id,
            paper_id: r.paper_id,
            submit_time: r.submit_time,
            score_rate: percentage(r.total_score, r.max_score),
            accuracy_rate: r.accuracy_rate,
        })
        .collect();
    points.sort_by_key(|p| (p.submit_time, p.record_id));
    points
}
