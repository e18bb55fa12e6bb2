//! Generation orchestration.
//!
//! Builds the request for the external generator (catalog snapshot,
//! leave-adjusted availability, constraint contract), dispatches the single
//! bounded call, enforces the response contract, validates the candidate
//! against the constraint predicates, and stores the accepted result as the
//! new draft. Any failure leaves the previous draft untouched.

use serde::Deserialize;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::{
    ClassroomId, Day, EntryId, GroupId, RequestStatus, SubjectId, TimeSlot, Timetable,
    TimetableEntry, UserId, WeeklyAvailability,
};
use crate::generator::{
    FacultyScheduleInput, GenerationProfile, GenerationRequest, GeneratorError,
    TimetableGenerator,
};
use crate::services::availability::resolve_availability;
use crate::services::constraints::{constraint_text, validate_timetable, CatalogSnapshot,
    ValidationReport};
use crate::store::{FullStore, StoreError};

/// A single user-facing "generation failed" condition with its cause.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// The response text broke the contract: not JSON, not an array, or
    /// entries missing/misnaming the six required fields.
    #[error("generator response violates the contract: {0}")]
    Contract(String),

    /// The generator produced a schedule the constraint predicates reject.
    #[error("generated timetable violates constraints: {0}")]
    ConstraintViolations(ValidationReport),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// One generated entry as the contract requires it: exactly the six fields,
/// day and time drawn from the fixed enumerations.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct GeneratedEntry {
    day: Day,
    time: TimeSlot,
    group_id: GroupId,
    subject_id: SubjectId,
    faculty_id: UserId,
    room_id: ClassroomId,
}

/// Run one complete generation and store the result as the new draft.
///
/// Returns the number of entries in the accepted draft. The call is bounded
/// by `deadline` and aborted if `cancel` fires; both count as generator
/// failures with no partial state.
pub async fn generate_draft(
    store: &dyn FullStore,
    generator: &dyn TimetableGenerator,
    profile: GenerationProfile,
    additional_constraints: Option<&str>,
    deadline: std::time::Duration,
    cancel: CancellationToken,
) -> Result<usize, GenerationError> {
    // 1. Snapshot the catalog and resolve per-faculty availability from
    //    approved leave only.
    let classrooms = store.classrooms().await?;
    let subjects = store.subjects().await?;
    let student_groups = store.student_groups().await?;
    let faculty = store.faculty().await?;
    let leave_requests = store.leave_requests().await?;

    let approved: Vec<_> = leave_requests
        .into_iter()
        .filter(|r| r.status == RequestStatus::Approved)
        .collect();
    for leave in &approved {
        if !faculty.iter().any(|f| f.id == leave.faculty_id) {
            warn!(
                leave_id = %leave.id,
                faculty_id = %leave.faculty_id,
                "approved leave references unknown faculty; skipping"
            );
        }
    }

    let availability: HashMap<UserId, WeeklyAvailability> = faculty
        .iter()
        .map(|member| (member.id.clone(), resolve_availability(member, &approved)))
        .collect();

    // 2. Assemble the request payload.
    let request = GenerationRequest {
        faculty_assignments: faculty
            .iter()
            .map(|member| FacultyScheduleInput {
                id: member.id.clone(),
                name: member.name.clone(),
                assignments: member.assignments.clone(),
                availability: availability[&member.id].clone(),
            })
            .collect(),
        classrooms: classrooms.clone(),
        subjects: subjects.clone(),
        student_groups: student_groups.clone(),
        time_slots: TimeSlot::ALL.to_vec(),
        days: Day::ALL.to_vec(),
        constraint_text: constraint_text(additional_constraints),
    };

    // 3. The single suspension point, bounded and cancellable.
    let tuning = profile.tuning();
    let response_text = tokio::select! {
        result = tokio::time::timeout(deadline, generator.generate(&request, &tuning)) => {
            match result {
                Ok(inner) => inner?,
                Err(_) => return Err(GeneratorError::Timeout(deadline).into()),
            }
        }
        _ = cancel.cancelled() => return Err(GeneratorError::Cancelled.into()),
    };

    // 4. Enforce the response contract and assign stable entry ids.
    let entries = parse_candidate(&response_text)?;

    // 5. Validate before anything is committed.
    let snapshot = CatalogSnapshot {
        classrooms: &classrooms,
        subjects: &subjects,
        student_groups: &student_groups,
        faculty: &faculty,
    };
    let report = validate_timetable(&entries, &snapshot, &availability);
    if !report.is_valid() {
        return Err(GenerationError::ConstraintViolations(report));
    }

    // 6. Accept: replace any previous draft.
    let count = entries.len();
    store.set_draft(Timetable::new(entries)).await?;
    info!(entries = count, "stored generated timetable as draft");
    Ok(count)
}

/// Parse the generator's response text into internal entries.
///
/// The top level must be a JSON array of six-field objects; anything else is
/// a contract violation. Each accepted entry gets a fresh stable id so later
/// swaps can match by id rather than by value.
fn parse_candidate(text: &str) -> Result<Vec<TimetableEntry>, GenerationError> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| GenerationError::Contract(format!("response is not JSON: {}", e)))?;
    if !value.is_array() {
        return Err(GenerationError::Contract(
            "response is not in the expected array format".to_string(),
        ));
    }
    let generated: Vec<GeneratedEntry> = serde_json::from_value(value)
        .map_err(|e| GenerationError::Contract(e.to_string()))?;

    Ok(generated
        .into_iter()
        .map(|entry| TimetableEntry {
            id: EntryId::new(Uuid::new_v4().to_string()),
            day: entry.day,
            time: entry.time,
            group_id: entry.group_id,
            subject_id: entry.subject_id,
            faculty_id: entry.faculty_id,
            room_id: entry.room_id,
        })
        .collect())
}
