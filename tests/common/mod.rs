// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use quiz_backend::{
    config::{AiConfig, Config},
    error::AppError,
    models::{
        answer::{Answer, NewAnswer},
        assistant::{ChatMessage, GenerateQuestionsRequest, GeneratedQuestion},
        exam_record::{ExamRecord, NewExamRecord},
        paper::{Paper, PaperStatus, PaperSummary},
        paper_question::{PaperQuestion, PaperQuestionDetail},
        question::{NewQuestion, Question, UpdateQuestionRequest},
        user::{Role, User},
    },
    repositories::{CatalogRepository, ResponseRepository, UserRepository},
    routes,
    services::assistant::Assistant,
    state::AppState,
    utils::hash::hash_password,
};
use serde_json::{Value, json};
use tokio::sync::Mutex;

pub const TEACHER_USERNAME: &str = "teacher";
pub const TEACHER_PASSWORD: &str = "teacher-pass";

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<User>,
    questions: Vec<Question>,
    papers: Vec<Paper>,
    paper_questions: Vec<PaperQuestion>,
    answers: Vec<Answer>,
    exam_records: Vec<ExamRecord>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory stand-in for the Postgres repositories, including the foreign key cascades.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub async fn answer_count(&self) -> usize {
        self.tables.lock().await.answers.len()
    }

    pub async fn exam_record_count(&self) -> usize {
        self.tables.lock().await.exam_records.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, username: &str, password_hash: &str, role: Role) -> Result<User, AppError> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.username == username) {
            return Err(AppError::Conflict(format!("Username '{}' already exists", username)));
        }

        let user = User {
            id: tables.next_id(),
            username: username.to_string(),
            password: password_hash.to_string(),
            role,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn create_question(&self, question: &NewQuestion) -> Result<Question, AppError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let created = Question {
            id: tables.next_id(),
            content: question.content.clone(),
            answer: question.answer.clone(),
            analysis: question.analysis.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.questions.push(created.clone());
        Ok(created)
    }

    async fn list_questions(&self) -> Result<Vec<Question>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.questions.iter().rev().cloned().collect())
    }

    async fn find_question(&self, id: i64) -> Result<Option<Question>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.questions.iter().find(|q| q.id == id).cloned())
    }

    async fn update_question(
        &self,
        id: i64,
        changes: &UpdateQuestionRequest,
    ) -> Result<Option<Question>, AppError> {
        let mut tables = self.tables.lock().await;
        let Some(question) = tables.questions.iter_mut().find(|q| q.id == id) else {
            return Ok(None);
        };

        if let Some(content) = &changes.content {
            question.content = content.clone();
        }
        if let Some(answer) = &changes.answer {
            question.answer = answer.clone();
        }
        if let Some(analysis) = &changes.analysis {
            question.analysis = Some(analysis.clone());
        }
        question.updated_at = Utc::now();
        Ok(Some(question.clone()))
    }

    async fn delete_question(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        let before = tables.questions.len();
        tables.questions.retain(|q| q.id != id);
        tables.paper_questions.retain(|pq| pq.question_id != id);
        Ok(tables.questions.len() < before)
    }

    async fn create_paper(&self, name: &str) -> Result<Paper, AppError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let paper = Paper {
            id: tables.next_id(),
            name: name.to_string(),
            status: PaperStatus::Draft,
            created_at: now,
            updated_at: now,
        };
        tables.papers.push(paper.clone());
        Ok(paper)
    }

    async fn list_papers(&self, status: Option<PaperStatus>) -> Result<Vec<PaperSummary>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .papers
            .iter()
            .rev()
            .filter(|p| status.is_none_or(|s| p.status == s))
            .map(|p| {
                let links: Vec<&PaperQuestion> = tables
                    .paper_questions
                    .iter()
                    .filter(|pq| pq.paper_id == p.id)
                    .collect();
                PaperSummary {
                    paper: p.clone(),
                    question_count: links.len(),
                    total_score: links.iter().map(|pq| pq.score).sum(),
                }
            })
            .collect())
    }

    async fn find_paper(&self, id: i64) -> Result<Option<Paper>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.papers.iter().find(|p| p.id == id).cloned())
    }

    async fn update_paper(
        &self,
        id: i64,
        name: Option<&str>,
        status: Option<PaperStatus>,
    ) -> Result<Option<Paper>, AppError> {
        let mut tables = self.tables.lock().await;
        let Some(paper) = tables.papers.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        if let Some(name) = name {
            paper.name = name.to_string();
        }
        if let Some(status) = status {
            paper.status = status;
        }
        paper.updated_at = Utc::now();
        Ok(Some(paper.clone()))
    }

    async fn delete_paper(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        let before = tables.papers.len();
        tables.papers.retain(|p| p.id != id);
        tables.paper_questions.retain(|pq| pq.paper_id != id);
        tables.answers.retain(|a| a.paper_id != id);
        tables.exam_records.retain(|r| r.paper_id != id);
        Ok(tables.papers.len() < before)
    }

    async fn add_question_to_paper(
        &self,
        paper_id: i64,
        question_id: i64,
        score: f64,
    ) -> Result<PaperQuestion, AppError> {
        let mut tables = self.tables.lock().await;
        let existing = tables
            .paper_questions
            .iter()
            .filter(|pq| pq.paper_id == paper_id)
            .collect::<Vec<_>>();
        if existing.iter().any(|pq| pq.question_id == question_id) {
            return Err(AppError::Conflict("Question is already on this paper".to_string()));
        }

        let question_order = existing.len() as i32 + 1;
        let association = PaperQuestion {
            id: tables.next_id(),
            paper_id,
            question_id,
            question_order,
            score,
            created_at: Utc::now(),
        };
        tables.paper_questions.push(association.clone());
        Ok(association)
    }

    async fn remove_question_from_paper(&self, paper_id: i64, question_id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        let before = tables.paper_questions.len();
        tables
            .paper_questions
            .retain(|pq| !(pq.paper_id == paper_id && pq.question_id == question_id));
        Ok(tables.paper_questions.len() < before)
    }

    async fn update_paper_question(
        &self,
        paper_id: i64,
        question_id: i64,
        question_order: Option<i32>,
        score: Option<f64>,
    ) -> Result<Option<PaperQuestion>, AppError> {
        let mut tables = self.tables.lock().await;
        let Some(association) = tables
            .paper_questions
            .iter_mut()
            .find(|pq| pq.paper_id == paper_id && pq.question_id == question_id)
        else {
            return Ok(None);
        };

        if let Some(order) = question_order {
            association.question_order = order;
        }
        if let Some(score) = score {
            association.score = score;
        }
        Ok(Some(association.clone()))
    }

    async fn questions_for_paper(&self, paper_id: i64) -> Result<Vec<PaperQuestionDetail>, AppError> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<PaperQuestionDetail> = tables
            .paper_questions
            .iter()
            .filter(|pq| pq.paper_id == paper_id)
            .filter_map(|pq| {
                let q = tables.questions.iter().find(|q| q.id == pq.question_id)?;
                Some(PaperQuestionDetail {
                    question_id: q.id,
                    question_order: pq.question_order,
                    score: pq.score,
                    content: q.content.clone(),
                    answer: q.answer.clone(),
                    analysis: q.analysis.clone(),
                })
            })
            .collect();
        rows.sort_by_key(|row| (row.question_order, row.question_id));
        Ok(rows)
    }
}

#[async_trait]
impl ResponseRepository for MemoryStore {
    async fn append_answer(&self, answer: &NewAnswer) -> Result<Answer, AppError> {
        let mut tables = self.tables.lock().await;
        let saved = Answer {
            id: tables.next_id(),
            student_id: answer.student_id.clone(),
            paper_id: answer.paper_id,
            question_id: answer.question_id,
            student_answer: answer.student_answer.clone(),
            is_correct: answer.is_correct,
            score: answer.score,
            answered_at: Utc::now(),
        };
        tables.answers.push(saved.clone());
        Ok(saved)
    }

    async fn append_exam_record(&self, record: &NewExamRecord) -> Result<ExamRecord, AppError> {
        let mut tables = self.tables.lock().await;
        let saved = ExamRecord {
            id: tables.next_id(),
            student_id: record.student_id.clone(),
            paper_id: record.paper_id,
            start_time: record.start_time,
            submit_time: record.submit_time,
            total_questions: record.total_questions,
            answered_questions: record.answered_questions,
            correct_answers: record.correct_answers,
            total_score: record.total_score,
            max_score: record.max_score,
            accuracy_rate: record.accuracy_rate,
            status: record.status,
        };
        tables.exam_records.push(saved.clone());
        Ok(saved)
    }

    async fn answers_for_paper(
        &self,
        paper_id: i64,
        question_id: Option<i64>,
    ) -> Result<Vec<Answer>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .answers
            .iter()
            .rev()
            .filter(|a| a.paper_id == paper_id && question_id.is_none_or(|q| a.question_id == q))
            .cloned()
            .collect())
    }

    async fn answers_for_student(
        &self,
        student_id: &str,
        paper_id: Option<i64>,
    ) -> Result<Vec<Answer>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .answers
            .iter()
            .rev()
            .filter(|a| a.student_id == student_id && paper_id.is_none_or(|p| a.paper_id == p))
            .cloned()
            .collect())
    }

    async fn exam_records_for_student(&self, student_id: &str) -> Result<Vec<ExamRecord>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .exam_records
            .iter()
            .rev()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn exam_records_for_paper(&self, paper_id: i64) -> Result<Vec<ExamRecord>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .exam_records
            .iter()
            .rev()
            .filter(|r| r.paper_id == paper_id)
            .cloned()
            .collect())
    }
}

/// Canned assistant. `reply: None` behaves like an unreachable model.
pub struct StubAssistant {
    pub reply: Option<String>,
    pub questions: Vec<GeneratedQuestion>,
}

impl Default for StubAssistant {
    fn default() -> Self {
        Self {
            reply: Some("Try drawing a diagram first.".to_string()),
            questions: vec![
                GeneratedQuestion {
                    content: "What is <b>2 + 2</b>?<script>alert(1)</script>".to_string(),
                    answer: "4".to_string(),
                    analysis: Some("Basic addition".to_string()),
                },
                GeneratedQuestion {
                    content: "Capital of France?".to_string(),
                    answer: "Paris".to_string(),
                    analysis: None,
                },
            ],
        }
    }
}

#[async_trait]
impl Assistant for StubAssistant {
    async fn generate_questions(
        &self,
        request: &GenerateQuestionsRequest,
    ) -> Result<Vec<GeneratedQuestion>, AppError> {
        if self.reply.is_none() {
            return Err(AppError::ServiceUnavailable(
                "AI assistant is not configured".to_string(),
            ));
        }
        Ok(self
            .questions
            .iter()
            .take(request.num_questions as usize)
            .cloned()
            .collect())
    }

    async fn chat(&self, _history: &[ChatMessage], _message: &str) -> Result<String, AppError> {
        self.reply
            .clone()
            .ok_or(AppError::BadGateway("model unreachable".to_string()))
    }
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
}

/// Spawns the app on a random port with the default stub assistant.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(StubAssistant::default()).await
}

/// Spawns the app on a random port, backed by a fresh in-memory store with a seeded teacher.
pub async fn spawn_app_with(assistant: StubAssistant) -> TestApp {
    let store = Arc::new(MemoryStore::default());

    let password = hash_password(TEACHER_PASSWORD).expect("Failed to hash password");
    store
        .create(TEACHER_USERNAME, &password, Role::Teacher)
        .await
        .expect("Failed to seed teacher");

    let config = Config {
        database_url: String::new(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        server_addr: "127.0.0.1:0".to_string(),
        teacher_username: None,
        teacher_password: None,
        ai: AiConfig::default(),
    };

    let state = AppState {
        users: store.clone(),
        catalog: store.clone(),
        responses: store.clone(),
        assistant: Arc::new(assistant),
        config,
    };

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        client: reqwest::Client::new(),
        store,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 200);

        let body: Value = response.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn teacher_token(&self) -> String {
        self.login(TEACHER_USERNAME, TEACHER_PASSWORD).await
    }

    /// Registers a student and returns (user id, token).
    pub async fn student(&self, username: &str) -> (i64, String) {
        let response = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({ "username": username, "password": "password123" }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201);

        let body: Value = response.json().await.unwrap();
        let id = body["id"].as_i64().unwrap();
        (id, self.login(username, "password123").await)
    }

    pub async fn post(&self, token: &str, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put(&self, token: &str, path: &str, body: Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, token: &str, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, token: &str, path: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Creates a question through the API and returns its id.
    pub async fn create_question(&self, token: &str, content: &str, answer: &str) -> i64 {
        let response = self
            .post(
                token,
                "/api/teacher/questions",
                json!({ "content": content, "answer": answer, "analysis": "Because." }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }

    /// Creates a draft paper holding the given question ids with the given scores.
    pub async fn create_paper(&self, token: &str, name: &str, questions: &[(i64, f64)]) -> i64 {
        let response = self
            .post(token, "/api/teacher/papers", json!({ "name": name }))
            .await;
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.unwrap();
        let paper_id = body["id"].as_i64().unwrap();

        for (question_id, score) in questions {
            let response = self
                .post(
                    token,
                    &format!("/api/teacher/papers/{}/questions", paper_id),
                    json!({ "question_id": question_id, "score": score }),
                )
                .await;
            assert_eq!(response.status().as_u16(), 201);
        }

        paper_id
    }
}
