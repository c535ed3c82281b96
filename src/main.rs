// src/main.rs

use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use quiz_backend::config::Config;
use quiz_backend::error::AppError;
use quiz_backend::models::user::Role;
use quiz_backend::repositories::{
    PgCatalogRepository, PgResponseRepository, PgUserRepository, UserRepository,
};
use quiz_backend::routes;
use quiz_backend::services::assistant::LlmAssistant;
use quiz_backend::state::AppState;
use quiz_backend::utils::hash::hash_password;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Initialize Database Pool with Retry
    let mut retry_count = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to connect to database after 5 retries: {}", e);
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied successfully.");

    let users = Arc::new(PgUserRepository::new(pool.clone()));

    if let Err(e) = seed_teacher_user(users.as_ref(), &config).await {
        tracing::error!("Failed to seed teacher user: {:?}", e);
    }

    if !config.ai.is_enabled() {
        tracing::warn!("AI_API_KEY not set; the assistant will use fallback replies");
    }

    let assistant = LlmAssistant::new(config.ai.clone()).expect("Failed to build the LLM client");

    let state = AppState {
        users,
        catalog: Arc::new(PgCatalogRepository::new(pool.clone())),
        responses: Arc::new(PgResponseRepository::new(pool)),
        assistant: Arc::new(assistant),
        config: config.clone(),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server_addr)
        .await
        .expect("Failed to bind server address");
    tracing::info!("Listening on {}", config.server_addr);

    // Start the server
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}

/// Creates the configured teacher account on first start.
async fn seed_teacher_user(users: &dyn UserRepository, config: &Config) -> Result<(), AppError> {
    let (Some(username), Some(password)) = (&config.teacher_username, &config.teacher_password)
    else {
        return Ok(());
    };

    if users.find_by_username(username).await?.is_some() {
        return Ok(());
    }

    tracing::info!("Seeding teacher user: {}", username);
    let hashed_password = hash_password(password)?;
    users.create(username, &hashed_password, Role::Teacher).await?;
    tracing::info!("Teacher user created successfully.");

    Ok(())
}
