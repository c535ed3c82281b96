// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{assistant, auth, exam, papers, questions, statistics},
    state::AppState,
    utils::jwt::{auth_middleware, teacher_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, teacher, student).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (repositories, assistant, config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let teacher_routes = Router::new()
        .route(
            "/questions",
            get(questions::list_questions).post(questions::create_question),
        )
        .route(
            "/questions/{id}",
            get(questions::get_question)
                .put(questions::update_question)
                .delete(questions::delete_question),
        )
        .route("/papers", get(papers::list_papers).post(papers::create_paper))
        .route(
            "/papers/{id}",
            get(papers::get_paper)
                .put(papers::update_paper)
                .delete(papers::delete_paper),
        )
        .route("/papers/{id}/publish", post(papers::publish_paper))
        .route("/papers/{id}/unpublish", post(papers::unpublish_paper))
        .route("/papers/{id}/archive", post(papers::archive_paper))
        .route("/papers/{id}/questions", post(papers::add_question))
        .route(
            "/papers/{id}/questions/{question_id}",
            put(papers::update_question).delete(papers::remove_question),
        )
        .route("/statistics/papers/{id}", get(statistics::paper_report))
        .route(
            "/statistics/papers/{id}/questions/{question_id}",
            get(statistics::question_report),
        )
        .route(
            "/statistics/students/{student_id}",
            get(statistics::student_report),
        )
        .route("/assistant/generate", post(assistant::generate_questions))
        // Double middleware protection: Auth first, then Teacher check
        .layer(middleware::from_fn(teacher_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let student_routes = Router::new()
        .route("/papers", get(exam::list_papers))
        .route("/papers/{id}", get(exam::get_paper))
        .route("/papers/{id}/submit", post(exam::submit_paper))
        .route("/papers/{id}/answers", get(exam::my_answers))
        .route("/records", get(exam::my_records))
        .route("/assistant/chat", post(assistant::chat))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/teacher", teacher_routes)
        .nest("/api/student", student_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
