// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Score weight given to a question when it is attached to a paper without an explicit score.
pub const DEFAULT_QUESTION_SCORE: f64 = 2.0;

/// Number of distinct wrong answers reported per question.
pub const TOP_WRONG_ANSWERS: usize = 5;

/// Number of fixed-width bins in a paper's score distribution.
pub const HISTOGRAM_BUCKETS: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub server_addr: String,
    pub teacher_username: Option<String>,
    pub teacher_password: Option<String>,
    pub ai: AiConfig,
}

/// Settings for the hosted language model used by the assistant.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// `None` disables the remote model; the assistant falls back to canned replies.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_history: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.deepseek.com/v1".to_string(),
            model: "deepseek-chat".to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            max_history: 20,
        }
    }
}

impl AiConfig {
    pub fn is_enabled(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = parse_or("JWT_EXPIRATION", 86_400);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let server_addr = env::var("SERVER_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let defaults = AiConfig::default();
        let ai = AiConfig {
            api_key: env::var("AI_API_KEY").ok(),
            base_url: env::var("AI_BASE_URL").unwrap_or(defaults.base_url),
            model: env::var("AI_MODEL").unwrap_or(defaults.model),
            max_tokens: parse_or("AI_MAX_TOKENS", defaults.max_tokens),
            temperature: parse_or("AI_TEMPERATURE", defaults.temperature),
            max_history: parse_or("AI_MAX_HISTORY", defaults.max_history),
        };

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            server_addr,
            teacher_username: env::var("TEACHER_USERNAME").ok(),
            teacher_password: env::var("TEACHER_PASSWORD").ok(),
            ai,
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
