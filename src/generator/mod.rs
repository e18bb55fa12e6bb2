//! External timetable generator boundary.
//!
//! The schedule-construction algorithm itself lives outside this crate: the
//! orchestrator ships the catalog and the constraint contract to an external
//! large-language-model service and trusts nothing about what comes back.
//! This module defines the trait for that boundary, its error taxonomy, the
//! request payload, and the Gemini HTTP implementation.

pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::api::{Assignment, Classroom, Day, StudentGroup, Subject, TimeSlot, UserId,
    WeeklyAvailability};

pub use gemini::GeminiGenerator;

/// Tuning preset for one generation run. Pure configuration: it adjusts the
/// generator's sampling parameters and never changes the constraint contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProfile {
    /// Minimize latency (no thinking budget).
    Speed,
    /// Service defaults.
    #[default]
    Balanced,
    /// Prefer deterministic output (low temperature).
    Accuracy,
}

impl std::fmt::Display for GenerationProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationProfile::Speed => f.write_str("speed"),
            GenerationProfile::Balanced => f.write_str("balanced"),
            GenerationProfile::Accuracy => f.write_str("accuracy"),
        }
    }
}

/// Profile-derived sampling parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeneratorTuning {
    pub temperature: Option<f64>,
    pub thinking_budget: Option<u32>,
}

impl GenerationProfile {
    pub fn tuning(self) -> GeneratorTuning {
        match self {
            GenerationProfile::Speed => GeneratorTuning {
                temperature: None,
                thinking_budget: Some(0),
            },
            GenerationProfile::Balanced => GeneratorTuning::default(),
            GenerationProfile::Accuracy => GeneratorTuning {
                temperature: Some(0.2),
                thinking_budget: None,
            },
        }
    }
}

/// Faculty view sent to the generator: identity, teaching load and the
/// leave-adjusted availability for this run. An empty slot list for a day
/// means the member is unavailable that day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacultyScheduleInput {
    pub id: UserId,
    pub name: String,
    pub assignments: Vec<Assignment>,
    pub availability: WeeklyAvailability,
}

/// The complete payload shipped to the external generator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub classrooms: Vec<Classroom>,
    pub subjects: Vec<Subject>,
    pub student_groups: Vec<StudentGroup>,
    pub faculty_assignments: Vec<FacultyScheduleInput>,
    pub time_slots: Vec<TimeSlot>,
    pub days: Vec<Day>,
    pub constraint_text: String,
}

/// Errors from the generator boundary itself. Contract-shape problems in the
/// returned text belong to the orchestrator, which owns response parsing.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Credentials or endpoint configuration absent or unusable. Fatal for
    /// generation until fixed externally; no retry will help.
    #[error("generator configuration error: {0}")]
    Configuration(String),

    /// The service could not be reached or the transport failed.
    #[error("generator transport error: {0}")]
    Transport(String),

    /// The service answered with a failure status or an unusable envelope.
    #[error("generator service error: {0}")]
    Service(String),

    /// The bounded call deadline elapsed.
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    /// The caller cancelled the in-flight call.
    #[error("generation was cancelled")]
    Cancelled,
}

/// The external generator boundary.
///
/// Implementations return the raw response text; the orchestrator parses it
/// and enforces the response contract. The call is the sole suspension point
/// of a generation run and may take tens of seconds.
#[async_trait]
pub trait TimetableGenerator: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
        tuning: &GeneratorTuning,
    ) -> Result<String, GeneratorError>;
}

/// Generator configuration loaded from environment variables.
///
/// # Environment Variables
/// - `GEMINI_API_KEY` (required): API key for the Gemini service
/// - `GEMINI_MODEL` (optional, default: `gemini-2.5-flash`)
/// - `GEMINI_ENDPOINT` (optional, default: the public v1beta endpoint)
/// - `GENERATION_TIMEOUT_SECS` (optional, default: 60)
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl GeneratorConfig {
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";
    pub const DEFAULT_ENDPOINT: &'static str =
        "https://generativelanguage.googleapis.com/v1beta";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn from_env() -> Result<Self, GeneratorError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                GeneratorError::Configuration("GEMINI_API_KEY is not set".to_string())
            })?;
        let model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string());
        let endpoint = std::env::var("GEMINI_ENDPOINT")
            .unwrap_or_else(|_| Self::DEFAULT_ENDPOINT.to_string());
        let timeout = std::env::var("GENERATION_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Self::DEFAULT_TIMEOUT);
        Ok(Self {
            api_key,
            model,
            endpoint,
            timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_profile_disables_thinking() {
        let tuning = GenerationProfile::Speed.tuning();
        assert_eq!(tuning.thinking_budget, Some(0));
        assert_eq!(tuning.temperature, None);
    }

    #[test]
    fn accuracy_profile_lowers_temperature() {
        let tuning = GenerationProfile::Accuracy.tuning();
        assert_eq!(tuning.temperature, Some(0.2));
        assert_eq!(tuning.thinking_budget, None);
    }

    #[test]
    fn balanced_profile_uses_service_defaults() {
        assert_eq!(GenerationProfile::Balanced.tuning(), GeneratorTuning::default());
    }

    #[test]
    fn profile_wire_names_are_lowercase() {
        assert_eq!(
            serde_json::to_string(&GenerationProfile::Accuracy).unwrap(),
            "\"accuracy\""
        );
        let profile: GenerationProfile = serde_json::from_str("\"speed\"").unwrap();
        assert_eq!(profile, GenerationProfile::Speed);
    }

    #[test]
    fn request_serializes_camel_case() {
        let request = GenerationRequest {
            classrooms: vec![],
            subjects: vec![],
            student_groups: vec![],
            faculty_assignments: vec![],
            time_slots: TimeSlot::ALL.to_vec(),
            days: Day::ALL.to_vec(),
            constraint_text: "rules".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("studentGroups").is_some());
        assert!(json.get("facultyAssignments").is_some());
        assert_eq!(json["days"][0], "Monday");
        assert_eq!(json["timeSlots"][0], "09:00 - 10:00");
    }
}
