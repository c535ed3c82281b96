// src/services/grading.rs

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// One question of a paper as seen by the grader.
#[derive(Debug, Clone)]
pub struct GradingItem {
    pub question_id: i64,
    pub canonical_answer: String,
    pub score_weight: f64,
}

/// Grade awarded to one answered question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionGrade {
    pub question_id: i64,
    /// Raw text as submitted, kept for the answer log.
    pub submitted: String,
    pub is_correct: bool,
    pub score: f64,
}

/// Outcome of grading one attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradingResult {
    /// Answered questions only, in paper order.
    pub results: Vec<QuestionGrade>,
    pub total_questions: usize,
    pub answered_count: usize,
    pub correct_count: usize,
    pub total_score: f64,
    /// Sum of every weight on the paper, answered or not.
    pub max_score: f64,
}

impl GradingResult {
    /// Percentage of answered questions that were correct.
    pub fn accuracy_rate(&self) -> f64 {
        if self.answered_count == 0 {
            return 0.0;
        }
        self.correct_count as f64 / self.answered_count as f64 * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.answered_count == self.total_questions
    }
}

/// Why an attempt was not graded.
#[derive(Debug, Clone, PartialEq)]
pub enum GradingRejection {
    /// Nothing non-blank was submitted.
    NoValidSubmission,
    /// An answer names a question that is not on the paper.
    UnknownQuestion(i64),
}

impl fmt::Display for GradingRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradingRejection::NoValidSubmission => write!(f, "No answers submitted"),
            GradingRejection::UnknownQuestion(id) => {
                write!(f, "Question {} is not part of this paper", id)
            }
        }
    }
}

impl std::error::Error for GradingRejection {}

/// Normalizes answer text for comparison: trims surrounding whitespace and lower-cases.
pub fn normalize_answer(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Grades a submission against a paper's question set.
///
/// * Blank or missing answers are unanswered and excluded from every count.
/// * An answer is correct when it equals the canonical answer after normalization.
/// * A correct answer earns the full weight, anything else earns 0.
pub fn grade_submission(
    questions: &[GradingItem],
    raw_answers: &HashMap<i64, String>,
) -> Result<GradingResult, GradingRejection> {
    if let Some(unknown) = raw_answers
        .keys()
        .find(|id| !questions.iter().any(|q| q.question_id == **id))
    {
        return Err(GradingRejection::UnknownQuestion(*unknown));
    }

    let max_score: f64 = questions.iter().map(|q| q.score_weight).sum();
    let mut results = Vec::new();
    let mut correct_count = 0;
    let mut total_score = 0.0;

    for question in questions {
        let Some(submitted) = raw_answers.get(&question.question_id) else {
            continue;
        };
        let given = normalize_answer(submitted);
        if given.is_empty() {
            continue;
        }

        let is_correct = given == normalize_answer(&question.canonical_answer);
        let score = if is_correct { question.score_weight } else { 0.0 };
        if is_correct {
            correct_count += 1;
        }
        total_score += score;

        results.push(QuestionGrade {
            question_id: question.question_id,
            submitted: submitted.clone(),
            is_correct,
            score,
        });
    }

    if results.is_empty() {
        return Err(GradingRejection::NoValidSubmission);
    }

    Ok(GradingResult {
        answered_count: results.len(),
        results,
        total_questions: questions.len(),
        correct_count,
        total_score,
        max_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, answer: &str, weight: f64) -> GradingItem {
        GradingItem {
            question_id: id,
            canonical_answer: answer.to_string(),
            score_weight: weight,
        }
    }

    fn answers(pairs: &[(i64, &str)]) -> HashMap<i64, String> {
        pairs.iter().map(|(id, a)| (*id, a.to_string())).collect()
    }

    #[test]
    fn test_grading_ignores_case_and_surrounding_whitespace() {
        let questions = vec![item(1, "paris", 1.0)];

        let result = grade_submission(&questions, &answers(&[(1, "  Paris  ")])).unwrap();
        assert!(result.results[0].is_correct);
        assert_eq!(result.total_score, 1.0);
    }

    #[test]
    fn test_grading_mixed_paper() {
        let questions = vec![item(1, "a", 2.0), item(2, "b", 2.0), item(3, "c", 2.0)];

        let result =
            grade_submission(&questions, &answers(&[(1, "A "), (2, "x"), (3, "c")])).unwrap();

        assert_eq!(result.results.len(), 3);
        assert!(result.results[0].is_correct);
        assert_eq!(result.results[0].score, 2.0);
        assert!(!result.results[1].is_correct);
        assert_eq!(result.results[1].score, 0.0);
        assert!(result.results[2].is_correct);
        assert_eq!(result.results[2].score, 2.0);
        assert_eq!(result.answered_count, 3);
        assert_eq!(result.correct_count, 2);
        assert_eq!(result.total_score, 4.0);
        assert_eq!(result.max_score, 6.0);
    }

    #[test]
    fn test_unanswered_questions_are_not_counted() {
        let questions = vec![item(1, "a", 1.0), item(2, "b", 1.0), item(3, "c", 1.0)];

        let result = grade_submission(&questions, &answers(&[(1, "a"), (3, "z")])).unwrap();
        assert_eq!(result.answered_count, 2);
        assert_eq!(result.correct_count, 1);
        assert!(!result.is_complete());
        assert_eq!(result.accuracy_rate(), 50.0);
    }

    #[test]
    fn test_blank_answer_counts_as_unanswered() {
        let questions = vec![item(1, "a", 1.0), item(2, "b", 1.0)];

        let result = grade_submission(&questions, &answers(&[(1, "a"), (2, "   ")])).unwrap();
        assert_eq!(result.answered_count, 1);
        assert_eq!(result.results.len(), 1);
    }

    #[test]
    fn test_max_score_includes_unanswered_weights() {
        let questions = vec![item(1, "a", 2.0), item(2, "b", 3.0), item(3, "c", 5.0)];

        let result = grade_submission(&questions, &answers(&[(1, "a"), (3, "c")])).unwrap();
        assert_eq!(result.max_score, 10.0);
        assert_eq!(result.total_score, 7.0);
    }

    #[test]
    fn test_empty_submission_is_rejected() {
        let questions = vec![item(1, "a", 1.0)];

        assert_eq!(
            grade_submission(&questions, &HashMap::new()),
            Err(GradingRejection::NoValidSubmission)
        );
        assert_eq!(
            grade_submission(&questions, &answers(&[(1, "")])),
            Err(GradingRejection::NoValidSubmission)
        );
    }

    #[test]
    fn test_unknown_question_is_rejected() {
        let questions = vec![item(1, "a", 1.0)];

        assert_eq!(
            grade_submission(&questions, &answers(&[(1, "a"), (99, "b")])),
            Err(GradingRejection::UnknownQuestion(99))
        );
    }

    #[test]
    fn test_score_never_exceeds_weight() {
        let questions = vec![item(1, "a", 0.5), item(2, "b", 4.0)];

        let result = grade_submission(&questions, &answers(&[(1, "a"), (2, "b")])).unwrap();
        for (grade, question) in result.results.iter().zip(&questions) {
            assert!(grade.score <= question.score_weight);
        }
    }

    #[test]
    fn test_unicode_case_folding() {
        let questions = vec![item(1, "Ärger", 1.0)];

        let result = grade_submission(&questions, &answers(&[(1, "ärger")])).unwrap();
        assert_eq!(result.correct_count, 1);
    }
}
