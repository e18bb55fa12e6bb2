//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the store
//! or the service layer. The acting user is identified by the `x-user-id`
//! header; role checks live in the lifecycle manager, not here.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::sse::{Event, Sse},
    Json,
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tracing::{error, info};

use super::dto::{
    GenerateRequest, GenerateResponse, HealthResponse, JobStatusResponse, NewLeaveRequest,
    NewSwapRequest, PublishResponse, ResolveRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{
    Classroom, ClassroomId, Faculty, GroupId, LeaveRequest, Notification, RequestId, RequestStatus,
    Role, StudentGroup, Subject, SubjectId, SwapRequest, Timetable, User, UserId,
};
use crate::services::generation_tracker::{JobStatus, LogLevel};
use crate::services::{generation, lifecycle};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Resolve the acting user from the `x-user-id` header.
async fn actor(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let id = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Unauthenticated("x-user-id header required".to_string()))?;
    let user_id = UserId::from(id);
    state
        .store
        .user_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::Unauthenticated(format!("unknown user: {}", id)))
}

fn require_admin(user: &User) -> Result<(), AppError> {
    if user.role != Role::Admin {
        return Err(AppError::Forbidden(format!(
            "Administrator role required, but {} is {}",
            user.id, user.role
        )));
    }
    Ok(())
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let store_status = match state.store.health_check().await {
        Ok(true) => "ok".to_string(),
        Ok(false) => "unhealthy".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        store: store_status,
    }))
}

// =============================================================================
// Catalog CRUD
// =============================================================================

pub async fn list_classrooms(State(state): State<AppState>) -> HandlerResult<Vec<Classroom>> {
    Ok(Json(state.store.classrooms().await?))
}

pub async fn upsert_classroom(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(classroom): Json<Classroom>,
) -> HandlerResult<Classroom> {
    require_admin(&actor(&state, &headers).await?)?;
    state.store.upsert_classroom(classroom.clone()).await?;
    Ok(Json(classroom))
}

pub async fn remove_classroom(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, AppError> {
    require_admin(&actor(&state, &headers).await?)?;
    state.store.remove_classroom(&ClassroomId::new(id)).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

pub async fn list_subjects(State(state): State<AppState>) -> HandlerResult<Vec<Subject>> {
    Ok(Json(state.store.subjects().await?))
}

pub async fn upsert_subject(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(subject): Json<Subject>,
) -> HandlerResult<Subject> {
    require_admin(&actor(&state, &headers).await?)?;
    state.store.upsert_subject(subject.clone()).await?;
    Ok(Json(subject))
}

pub async fn remove_subject(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, AppError> {
    require_admin(&actor(&state, &headers).await?)?;
    state.store.remove_subject(&SubjectId::new(id)).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

pub async fn list_student_groups(
    State(state): State<AppState>,
) -> HandlerResult<Vec<StudentGroup>> {
    Ok(Json(state.store.student_groups().await?))
}

pub async fn upsert_student_group(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(group): Json<StudentGroup>,
) -> HandlerResult<StudentGroup> {
    require_admin(&actor(&state, &headers).await?)?;
    state.store.upsert_student_group(group.clone()).await?;
    Ok(Json(group))
}

pub async fn remove_student_group(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, AppError> {
    require_admin(&actor(&state, &headers).await?)?;
    state.store.remove_student_group(&GroupId::new(id)).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

pub async fn list_faculty(State(state): State<AppState>) -> HandlerResult<Vec<Faculty>> {
    Ok(Json(state.store.faculty().await?))
}

pub async fn upsert_faculty(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(faculty): Json<Faculty>,
) -> HandlerResult<Faculty> {
    require_admin(&actor(&state, &headers).await?)?;
    state.store.upsert_faculty(faculty.clone()).await?;
    Ok(Json(faculty))
}

pub async fn remove_faculty(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, AppError> {
    require_admin(&actor(&state, &headers).await?)?;
    state.store.remove_faculty(&UserId::new(id)).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

pub async fn list_users(State(state): State<AppState>) -> HandlerResult<Vec<User>> {
    Ok(Json(state.store.users().await?))
}

pub async fn upsert_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(user): Json<User>,
) -> HandlerResult<User> {
    require_admin(&actor(&state, &headers).await?)?;
    state.store.upsert_user(user.clone()).await?;
    Ok(Json(user))
}

// =============================================================================
// Timetable Generation
// =============================================================================

/// POST /v1/timetable/generate
///
/// Start a generation run in the background. Returns 202 with a job id, or
/// 409 while a run is already in flight.
pub async fn generate_timetable(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<GenerateRequest>,
) -> Result<(axum::http::StatusCode, Json<GenerateResponse>), AppError> {
    require_admin(&actor(&state, &headers).await?)?;

    let (job_id, cancel) = state.tracker.try_begin().ok_or_else(|| {
        AppError::Conflict("a generation run is already in flight".to_string())
    })?;
    let response_job_id = job_id.clone();

    let tracker = state.tracker.clone();
    let store = state.store.clone();
    let generator = state.generator.clone();
    let deadline = state.generation_deadline;

    tokio::spawn(async move {
        tracker.log(
            &job_id,
            LogLevel::Info,
            format!("Generation started with {} profile", request.profile),
        );
        let result = generation::generate_draft(
            store.as_ref(),
            generator.as_ref(),
            request.profile,
            request.additional_constraints.as_deref(),
            deadline,
            cancel,
        )
        .await;

        match result {
            Ok(entries) => {
                info!(job_id = %job_id, entries, "generation run completed");
                tracker.log(
                    &job_id,
                    LogLevel::Success,
                    format!("Draft timetable ready with {} entries", entries),
                );
                tracker.complete_job(&job_id, Some(serde_json::json!({ "entries": entries })));
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "generation run failed");
                tracker.fail_job(&job_id, e.to_string());
            }
        }
    });

    Ok((
        axum::http::StatusCode::ACCEPTED,
        Json(GenerateResponse {
            job_id: response_job_id.clone(),
            message: format!(
                "Generation started. Track progress at /v1/jobs/{}/logs",
                response_job_id
            ),
        }),
    ))
}

/// POST /v1/timetable/generate/cancel
pub async fn cancel_generation(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> HandlerResult<GenerateResponse> {
    require_admin(&actor(&state, &headers).await?)?;
    let job_id = state
        .tracker
        .cancel_active()
        .ok_or_else(|| AppError::Conflict("no generation run in flight".to_string()))?;
    Ok(Json(GenerateResponse {
        job_id,
        message: "Generation cancelled".to_string(),
    }))
}

// =============================================================================
// Draft / Published Timetable
// =============================================================================

/// GET /v1/timetable/draft
pub async fn get_draft(State(state): State<AppState>) -> HandlerResult<Timetable> {
    let draft = state
        .store
        .draft()
        .await?
        .ok_or_else(|| AppError::NotFound("no draft timetable".to_string()))?;
    Ok(Json(draft))
}

/// GET /v1/timetable/published
pub async fn get_published(State(state): State<AppState>) -> HandlerResult<Timetable> {
    let published = state
        .store
        .published()
        .await?
        .ok_or_else(|| AppError::NotFound("no published timetable".to_string()))?;
    Ok(Json(published))
}

/// POST /v1/timetable/publish
pub async fn publish_timetable(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> HandlerResult<PublishResponse> {
    let user = actor(&state, &headers).await?;
    let entries = lifecycle::publish_draft(state.store.as_ref(), &user).await?;
    Ok(Json(PublishResponse { entries }))
}

/// POST /v1/timetable/discard
pub async fn discard_timetable(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<axum::http::StatusCode, AppError> {
    let user = actor(&state, &headers).await?;
    lifecycle::discard_draft(state.store.as_ref(), &user).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

// =============================================================================
// Leave Requests
// =============================================================================

/// POST /v1/leave-requests
pub async fn create_leave_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewLeaveRequest>,
) -> Result<(axum::http::StatusCode, Json<LeaveRequest>), AppError> {
    let user = actor(&state, &headers).await?;
    let request = LeaveRequest {
        // Overwritten by the lifecycle manager.
        id: RequestId::new(String::new()),
        faculty_id: user.id.clone(),
        start_date: body.start_date,
        end_date: body.end_date,
        reason: body.reason,
        status: RequestStatus::Pending,
        leave_type: body.leave_type,
        half_day_session: body.half_day_session,
    };
    let filed = lifecycle::submit_leave_request(state.store.as_ref(), &user, request).await?;
    Ok((axum::http::StatusCode::CREATED, Json(filed)))
}

/// GET /v1/leave-requests
pub async fn list_leave_requests(
    State(state): State<AppState>,
) -> HandlerResult<Vec<LeaveRequest>> {
    Ok(Json(state.store.leave_requests().await?))
}

/// POST /v1/leave-requests/{id}/resolve
pub async fn resolve_leave_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ResolveRequest>,
) -> HandlerResult<LeaveRequest> {
    let user = actor(&state, &headers).await?;
    let resolved = lifecycle::resolve_leave_request(
        state.store.as_ref(),
        &user,
        &RequestId::new(id),
        body.decision,
    )
    .await?;
    Ok(Json(resolved))
}

// =============================================================================
// Swap Requests
// =============================================================================

/// POST /v1/swap-requests
pub async fn create_swap_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewSwapRequest>,
) -> Result<(axum::http::StatusCode, Json<SwapRequest>), AppError> {
    let user = actor(&state, &headers).await?;
    let filed = lifecycle::submit_swap_request(
        state.store.as_ref(),
        &user,
        body.my_entry_id,
        body.their_entry_id,
        body.reason,
    )
    .await?;
    Ok((axum::http::StatusCode::CREATED, Json(filed)))
}

/// GET /v1/swap-requests
pub async fn list_swap_requests(State(state): State<AppState>) -> HandlerResult<Vec<SwapRequest>> {
    Ok(Json(state.store.swap_requests().await?))
}

/// POST /v1/swap-requests/{id}/resolve
pub async fn resolve_swap_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ResolveRequest>,
) -> HandlerResult<SwapRequest> {
    let user = actor(&state, &headers).await?;
    let resolved = lifecycle::resolve_swap_request(
        state.store.as_ref(),
        &user,
        &RequestId::new(id),
        body.decision,
    )
    .await?;
    Ok(Json(resolved))
}

// =============================================================================
// Notifications
// =============================================================================

/// GET /v1/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> HandlerResult<Vec<Notification>> {
    let user = actor(&state, &headers).await?;
    Ok(Json(state.store.notifications_for(&user.id).await?))
}

/// POST /v1/notifications/read
pub async fn mark_notifications_read(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<axum::http::StatusCode, AppError> {
    let user = actor(&state, &headers).await?;
    state.store.mark_notifications_read(&user.id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

// =============================================================================
// Async Job Management
// =============================================================================

/// GET /v1/jobs/{job_id}
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> HandlerResult<JobStatusResponse> {
    let job = state
        .tracker
        .get_job(&job_id)
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))?;

    Ok(Json(JobStatusResponse {
        job_id: job.job_id,
        status: format!("{:?}", job.status).to_lowercase(),
        logs: job.logs,
        result: job.result,
    }))
}

/// GET /v1/jobs/{job_id}/logs
///
/// Stream job logs via Server-Sent Events (SSE).
pub async fn stream_job_logs(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    // Verify job exists
    if state.tracker.get_job(&job_id).is_none() {
        return Err(AppError::NotFound(format!("Job {} not found", job_id)));
    }

    let tracker = state.tracker.clone();
    let stream = async_stream::stream! {
        let mut last_log_count = 0;
        loop {
            // Send new logs since last check
            let logs = tracker.get_logs(&job_id);
            for log in logs.iter().skip(last_log_count) {
                let event_data = serde_json::to_string(log).unwrap_or_default();
                yield Ok(Event::default().data(event_data));
            }
            last_log_count = logs.len();

            // Check if job is complete
            if let Some(job) = tracker.get_job(&job_id) {
                if job.status != JobStatus::Running {
                    let final_event = serde_json::json!({
                        "status": job.status,
                        "result": job.result,
                    });
                    yield Ok(Event::default()
                        .event("complete")
                        .data(serde_json::to_string(&final_event).unwrap_or_default()));
                    break;
                }
            } else {
                break;
            }

            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    };

    Ok(Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(1))
            .text("keep-alive"),
    ))
}
