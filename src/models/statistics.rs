// src/models/statistics.rs

use serde::Serialize;

use crate::config::HISTOGRAM_BUCKETS;

/// Rounds a metric for display. Engines keep full precision.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Answer-level statistics for one paper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaperStatistics {
    pub total_answers: usize,
    pub correct_answers: usize,
    pub accuracy_rate: f64,
    pub average_score: f64,
}

impl PaperStatistics {
    pub fn rounded(mut self) -> Self {
        self.accuracy_rate = round2(self.accuracy_rate);
        self.average_score = round2(self.average_score);
        self
    }
}

/// Exam-level statistics for one student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentStatistics {
    pub total_exams: usize,
    pub average_score: f64,
    pub total_score: f64,
    pub best_score: f64,
}

impl StudentStatistics {
    pub fn rounded(mut self) -> Self {
        self.average_score = round2(self.average_score);
        self.total_score = round2(self.total_score);
        self.best_score = round2(self.best_score);
        self
    }
}

/// How often a particular wrong answer was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrongAnswerCount {
    pub answer: String,
    pub count: usize,
}

/// Statistics for one (paper, question) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionStatistics {
    pub total_answers: usize,
    pub correct_answers: usize,
    pub accuracy_rate: f64,
    /// Most frequent wrong answers, most common first.
    pub common_wrong_answers: Vec<WrongAnswerCount>,
}

impl QuestionStatistics {
    pub fn rounded(mut self) -> Self {
        self.accuracy_rate = round2(self.accuracy_rate);
        self
    }
}

/// Per-question statistics labeled with the question it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionAnalysis {
    pub question_id: i64,
    pub question_order: i32,
    pub content: String,
    pub score: f64,
    #[serde(flatten)]
    pub statistics: QuestionStatistics,
}

/// Counts of attempts per 10-point band of the normalized 0-100 score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreHistogram {
    pub buckets: [usize; HISTOGRAM_BUCKETS],
}

impl ScoreHistogram {
    /// Display labels, e.g. "0-10", ..., "90-100".
    pub fn labels() -> Vec<String> {
        let width = 100 / HISTOGRAM_BUCKETS;
        (0..HISTOGRAM_BUCKETS)
            .map(|i| format!("{}-{}", i * width, (i + 1) * width))
            .collect()
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().sum()
    }
}

/// One point of a student's score trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub record_id: i64,
    pub paper_id: i64,
    pub submit_time: chrono::DateTime<chrono::Utc>,
    /// Score as a percentage of the record's own max score.
    pub score_rate: f64,
    pub accuracy_rate: f64,
}

/// Teacher's statistics view of a paper.
#[derive(Debug, Serialize)]
pub struct PaperReport {
    pub paper_id: i64,
    pub paper_name: String,
    pub exam_count: usize,
    pub answers: PaperStatistics,
    pub score_distribution: ScoreDistribution,
    pub questions: Vec<QuestionAnalysis>,
}

/// Histogram paired with its labels for rendering.
#[derive(Debug, Serialize)]
pub struct ScoreDistribution {
    pub labels: Vec<String>,
    pub counts: [usize; HISTOGRAM_BUCKETS],
}

impl From<ScoreHistogram> for ScoreDistribution {
    fn from(histogram: ScoreHistogram) -> Self {
        Self {
            labels: ScoreHistogram::labels(),
            counts: histogram.buckets,
        }
    }
}

/// Statistics and trend for one student.
#[derive(Debug, Serialize)]
pub struct StudentReport {
    pub student_id: String,
    pub statistics: StudentStatistics,
    pub trend: Vec<TrendPoint>,
}
