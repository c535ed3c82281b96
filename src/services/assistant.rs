// src/services/assistant.rs

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::{
    config::AiConfig,
    error::AppError,
    models::assistant::{
        ChatMessage, ChatResponse, ChatRole, GenerateQuestionsRequest, GeneratedQuestion,
    },
};

const CHAT_SYSTEM_PROMPT: &str = "You are the course assistant of an online classroom. \
Help students with questions about their courses, explain difficult concepts in plain \
language, suggest study methods and plans, and encourage them to keep learning. \
When you are not sure about something, say so honestly and suggest asking the teacher. \
Keep answers friendly, patient and concise.";

const GENERATION_SYSTEM_PROMPT: &str = "You are an experienced teacher who writes exam \
questions. Follow the user's requirements exactly and reply with JSON only.";

/// Returned to students when the language model cannot be reached.
pub const FALLBACK_REPLY: &str = "The course assistant is not available right now. \
Please try again later, or ask your teacher for help.";

const GENERATION_MAX_TOKENS: u32 = 4000;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*(.*?)\s*```\s*$").expect("valid code fence pattern")
});

/// Text-generation collaborator used for question drafting and the student chat.
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn generate_questions(
        &self,
        request: &GenerateQuestionsRequest,
    ) -> Result<Vec<GeneratedQuestion>, AppError>;

    async fn chat(&self, history: &[ChatMessage], message: &str) -> Result<String, AppError>;
}

/// Answers a chat turn, degrading to [`FALLBACK_REPLY`] when the model fails.
pub async fn chat_or_fallback(
    assistant: &dyn Assistant,
    history: &[ChatMessage],
    message: &str,
) -> ChatResponse {
    match assistant.chat(history, message).await {
        Ok(reply) => ChatResponse {
            reply,
            from_model: true,
        },
        Err(e) => {
            tracing::warn!("Assistant chat unavailable, using fallback reply: {}", e);
            ChatResponse {
                reply: FALLBACK_REPLY.to_string(),
                from_model: false,
            }
        }
    }
}

/// Builds the user prompt for a question generation request.
pub fn generation_prompt(request: &GenerateQuestionsRequest) -> String {
    format!(
        "Write {count} {kind} questions for {subject} ({grade}), focused on: {points}.\n\
         Every question needs its content, its answer and an analysis of the answer.\n\
         Reply strictly in this JSON format, with no other text:\n\
         {{\n  \"quizzes\": [\n    {{\"content\": \"Question text. A. option 1, B. option 2, C. option 3, D. option 4\", \
         \"answer\": \"A\", \"analysis\": \"Why A is correct\"}}\n  ]\n}}\n\
         All keys must be lowercase English. For choice questions put the question and its \
         options in content and only the option letter in answer. Keep answers short so \
         they can be checked by exact match.",
        count = request.num_questions,
        kind = request.question_type,
        subject = request.subject,
        grade = request.grade,
        points = request.knowledge_points,
    )
}

#[derive(Deserialize)]
struct GeneratedBatch {
    #[serde(alias = "questions", default)]
    quizzes: Vec<GeneratedItem>,
}

#[derive(Deserialize)]
struct GeneratedItem {
    content: Option<String>,
    answer: Option<serde_json::Value>,
    analysis: Option<String>,
}

/// Parses a model reply into questions, skipping entries without content or answer.
/// Replies wrapped in a Markdown code fence are unwrapped first.
pub fn parse_generated_questions(reply: &str) -> Result<Vec<GeneratedQuestion>, AppError> {
    let body = CODE_FENCE
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map_or(reply, |m| m.as_str());

    let batch: GeneratedBatch = serde_json::from_str(body)
        .map_err(|e| AppError::BadGateway(format!("Model reply is not valid JSON: {}", e)))?;

    let questions: Vec<GeneratedQuestion> = batch
        .quizzes
        .into_iter()
        .filter_map(|item| {
            let content = item.content?.trim().to_string();
            // Models sometimes answer numeric questions with a bare number.
            let answer = match item.answer? {
                serde_json::Value::String(s) => s.trim().to_string(),
                serde_json::Value::Null => return None,
                other => other.to_string(),
            };
            if content.is_empty() || answer.is_empty() {
                return None;
            }
            Some(GeneratedQuestion {
                content,
                answer,
                analysis: item.analysis.filter(|a| !a.trim().is_empty()),
            })
        })
        .collect();

    if questions.is_empty() {
        return Err(AppError::BadGateway(
            "Model reply contained no usable questions".to_string(),
        ));
    }

    Ok(questions)
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct LlmAssistant {
    client: Client,
    config: AiConfig,
}

impl LlmAssistant {
    pub fn new(config: AiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn api_key(&self) -> Result<&str, AppError> {
        match self.config.api_key.as_deref() {
            Some(key) if self.config.is_enabled() => Ok(key),
            _ => Err(AppError::ServiceUnavailable(
                "AI assistant is not configured".to_string(),
            )),
        }
    }

    async fn complete(
        &self,
        messages: Vec<serde_json::Value>,
        max_tokens: u32,
    ) -> Result<String, AppError> {
        let api_key = self.api_key()?;
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let payload = json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": self.config.temperature,
            "max_tokens": max_tokens,
        });

        tracing::debug!("Sending completion request to {} ({} messages)", url, messages.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::BadGateway(format!(
                "Model API returned {}: {}",
                status, body
            )));
        }

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AppError::BadGateway("Model returned an empty reply".to_string()))
    }
}

/// Keeps the most recent `limit` turns of a conversation.
pub fn recent_history(history: &[ChatMessage], limit: usize) -> &[ChatMessage] {
    &history[history.len().saturating_sub(limit)..]
}

#[async_trait]
impl Assistant for LlmAssistant {
    async fn generate_questions(
        &self,
        request: &GenerateQuestionsRequest,
    ) -> Result<Vec<GeneratedQuestion>, AppError> {
        let messages = vec![
            json!({"role": "system", "content": GENERATION_SYSTEM_PROMPT}),
            json!({"role": "user", "content": generation_prompt(request)}),
        ];

        let reply = self.complete(messages, GENERATION_MAX_TOKENS).await?;
        tracing::debug!("Generation reply length={}", reply.len());

        let mut questions = parse_generated_questions(&reply)?;
        questions.truncate(request.num_questions as usize);
        Ok(questions)
    }

    async fn chat(&self, history: &[ChatMessage], message: &str) -> Result<String, AppError> {
        let mut messages = vec![json!({"role": "system", "content": CHAT_SYSTEM_PROMPT})];
        for turn in recent_history(history, self.config.max_history) {
            let role = match turn.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            };
            messages.push(json!({"role": role, "content": turn.content}));
        }
        messages.push(json!({"role": "user", "content": message}));

        self.complete(messages, self.config.max_tokens).await
    }
}
