//! Data Transfer Objects for the HTTP API.
//!
//! Domain types (catalog entities, requests, timetables) already derive
//! Serialize/Deserialize in [`crate::api`] and go over the wire as-is; this
//! module holds only the shapes that exist purely for the REST surface.

use serde::{Deserialize, Serialize};

use chrono::NaiveDate;

use crate::api::{EntryId, HalfDaySession, LeaveType};
use crate::generator::GenerationProfile;
use crate::services::generation_tracker::LogEntry;
use crate::services::Decision;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Store health
    pub store: String,
}

/// Request body for starting a generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Speed/quality trade-off, defaults to balanced.
    #[serde(default)]
    pub profile: GenerationProfile,
    /// Free-text constraints appended to the built-in scheduling rules.
    #[serde(default)]
    pub additional_constraints: Option<String>,
}

/// Response for an accepted generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Job ID for tracking the run
    pub job_id: String,
    /// Message about the operation
    pub message: String,
}

/// Job status response for generation runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    /// Job ID
    pub job_id: String,
    /// Job status
    pub status: String,
    /// Log entries
    pub logs: Vec<LogEntry>,
    /// Result if completed
    pub result: Option<serde_json::Value>,
}

/// Request body for filing a leave request. Identity and status are set
/// server-side from the actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLeaveRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub leave_type: LeaveType,
    #[serde(default)]
    pub half_day_session: Option<HalfDaySession>,
}

/// Request body for filing a swap request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSwapRequest {
    pub my_entry_id: EntryId,
    pub their_entry_id: EntryId,
    pub reason: String,
}

/// Request body for resolving a pending request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub decision: Decision,
}

/// Response for draft publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishResponse {
    /// Number of entries in the now-published timetable
    pub entries: usize,
}
