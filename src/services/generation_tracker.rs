//! Generation run tracking.
//!
//! In-memory tracker for background generation runs: progress logs, final
//! status, and cancellation. Only one run may be in flight at a time (the
//! external call is the single suspension point of the system and the UI
//! disables re-submission while it is pending), so `try_begin` refuses to
//! start a second run while one is Running.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// A single log entry with timestamp and message.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LogEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Run status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

/// Run metadata and logs.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Job {
    pub job_id: String,
    pub status: JobStatus,
    pub logs: Vec<LogEntry>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Result of the run (e.g., entry count if successful)
    pub result: Option<serde_json::Value>,
}

struct TrackerState {
    jobs: HashMap<String, Job>,
    tokens: HashMap<String, CancellationToken>,
    active: Option<String>,
}

/// In-memory generation tracker.
#[derive(Clone)]
pub struct GenerationTracker {
    state: Arc<RwLock<TrackerState>>,
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(TrackerState {
                jobs: HashMap::new(),
                tokens: HashMap::new(),
                active: None,
            })),
        }
    }

    /// Start a new run unless one is already in flight. Returns the run id
    /// and its cancellation token, or `None` while another run is Running.
    pub fn try_begin(&self) -> Option<(String, CancellationToken)> {
        let mut state = self.state.write();
        if let Some(active) = &state.active {
            if state
                .jobs
                .get(active)
                .is_some_and(|job| job.status == JobStatus::Running)
            {
                return None;
            }
        }

        let job_id = Uuid::new_v4().to_string();
        let token = CancellationToken::new();
        state.jobs.insert(
            job_id.clone(),
            Job {
                job_id: job_id.clone(),
                status: JobStatus::Running,
                logs: vec![],
                created_at: chrono::Utc::now(),
                completed_at: None,
                result: None,
            },
        );
        state.tokens.insert(job_id.clone(), token.clone());
        state.active = Some(job_id.clone());
        Some((job_id, token))
    }

    /// Add a log entry to a run.
    pub fn log(&self, job_id: &str, level: LogLevel, message: impl Into<String>) {
        let mut state = self.state.write();
        if let Some(job) = state.jobs.get_mut(job_id) {
            job.logs.push(LogEntry {
                timestamp: chrono::Utc::now(),
                level,
                message: message.into(),
            });
        }
    }

    /// Mark a run as completed with optional result.
    pub fn complete_job(&self, job_id: &str, result: Option<serde_json::Value>) {
        let mut state = self.state.write();
        if let Some(job) = state.jobs.get_mut(job_id) {
            job.status = JobStatus::Completed;
            job.completed_at = Some(chrono::Utc::now());
            job.result = result;
        }
        state.tokens.remove(job_id);
    }

    /// Mark a run as failed.
    pub fn fail_job(&self, job_id: &str, error_message: impl Into<String>) {
        let mut state = self.state.write();
        if let Some(job) = state.jobs.get_mut(job_id) {
            job.status = JobStatus::Failed;
            job.completed_at = Some(chrono::Utc::now());
            job.logs.push(LogEntry {
                timestamp: chrono::Utc::now(),
                level: LogLevel::Error,
                message: error_message.into(),
            });
        }
        state.tokens.remove(job_id);
    }

    /// Cancel the in-flight run, if any. Returns the cancelled run's id.
    pub fn cancel_active(&self) -> Option<String> {
        let state = self.state.read();
        let active = state.active.clone()?;
        let running = state
            .jobs
            .get(&active)
            .is_some_and(|job| job.status == JobStatus::Running);
        if !running {
            return None;
        }
        if let Some(token) = state.tokens.get(&active) {
            token.cancel();
        }
        Some(active)
    }

    /// Get a run by ID.
    pub fn get_job(&self, job_id: &str) -> Option<Job> {
        self.state.read().jobs.get(job_id).cloned()
    }

    /// Get all logs for a run.
    pub fn get_logs(&self, job_id: &str) -> Vec<LogEntry> {
        self.state
            .read()
            .jobs
            .get(job_id)
            .map(|job| job.logs.clone())
            .unwrap_or_default()
    }
}

impl Default for GenerationTracker {
    fn default() -> Self {
        Self::new()
    }
}
