//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Catalog CRUD
        .route("/classrooms", get(handlers::list_classrooms))
        .route("/classrooms", post(handlers::upsert_classroom))
        .route("/classrooms/{id}", delete(handlers::remove_classroom))
        .route("/subjects", get(handlers::list_subjects))
        .route("/subjects", post(handlers::upsert_subject))
        .route("/subjects/{id}", delete(handlers::remove_subject))
        .route("/student-groups", get(handlers::list_student_groups))
        .route("/student-groups", post(handlers::upsert_student_group))
        .route("/student-groups/{id}", delete(handlers::remove_student_group))
        .route("/faculty", get(handlers::list_faculty))
        .route("/faculty", post(handlers::upsert_faculty))
        .route("/faculty/{id}", delete(handlers::remove_faculty))
        .route("/users", get(handlers::list_users))
        .route("/users", post(handlers::upsert_user))
        // Timetable generation and lifecycle
        .route("/timetable/generate", post(handlers::generate_timetable))
        .route("/timetable/generate/cancel", post(handlers::cancel_generation))
        .route("/timetable/draft", get(handlers::get_draft))
        .route("/timetable/published", get(handlers::get_published))
        .route("/timetable/publish", post(handlers::publish_timetable))
        .route("/timetable/discard", post(handlers::discard_timetable))
        // Job management
        .route("/jobs/{job_id}", get(handlers::get_job_status))
        .route("/jobs/{job_id}/logs", get(handlers::stream_job_logs))
        // Request lifecycle
        .route("/leave-requests", post(handlers::create_leave_request))
        .route("/leave-requests", get(handlers::list_leave_requests))
        .route("/leave-requests/{id}/resolve", post(handlers::resolve_leave_request))
        .route("/swap-requests", post(handlers::create_swap_request))
        .route("/swap-requests", get(handlers::list_swap_requests))
        .route("/swap-requests/{id}/resolve", post(handlers::resolve_swap_request))
        // Notifications
        .route("/notifications", get(handlers::list_notifications))
        .route("/notifications/read", post(handlers::mark_notifications_read));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
