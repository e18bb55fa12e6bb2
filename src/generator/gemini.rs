//! Gemini implementation of the generator boundary.
//!
//! Sends one `generateContent` call per generation run with a JSON response
//! schema pinning the output to an array of six-field entry objects whose
//! day and time values are drawn from the fixed enumerations.

use serde_json::{json, Value};

use super::{GenerationRequest, GeneratorConfig, GeneratorError, GeneratorTuning,
    TimetableGenerator};
use crate::api::{Day, TimeSlot};

const SYSTEM_INSTRUCTION: &str = "You are an expert university timetable scheduler. Your task is to generate a weekly class schedule for a college department based on the provided data and constraints. The output must be a valid JSON array matching the provided schema. You must strictly adhere to all constraints provided. Your primary goal is to create a valid, clash-free, and optimized schedule. Ensure all subjects for each group are scheduled for the exact number of times per week as specified.";

/// Gemini-backed generator.
pub struct GeminiGenerator {
    client: reqwest::Client,
    config: GeneratorConfig,
}

impl GeminiGenerator {
    /// Build a generator from configuration. The per-request deadline is
    /// enforced by the orchestrator; the client timeout here is a backstop
    /// so a dead connection cannot outlive the run.
    pub fn new(config: GeneratorConfig) -> Result<Self, GeneratorError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GeneratorError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Build a generator from environment variables.
    pub fn from_env() -> Result<Self, GeneratorError> {
        Self::new(GeneratorConfig::from_env()?)
    }

    fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.endpoint, self.config.model, self.config.api_key
        )
    }
}

#[async_trait::async_trait]
impl TimetableGenerator for GeminiGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
        tuning: &GeneratorTuning,
    ) -> Result<String, GeneratorError> {
        let body = build_request_body(request, tuning)
            .map_err(|e| GeneratorError::Service(format!("payload serialization: {}", e)))?;

        let response = self
            .client
            .post(self.request_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| GeneratorError::Transport(e.to_string()))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| GeneratorError::Service(format!("unreadable response body: {}", e)))?;

        if !status.is_success() {
            let message = payload
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("no error message");
            return Err(GeneratorError::Service(format!(
                "service returned {}: {}",
                status, message
            )));
        }

        extract_response_text(&payload)
    }
}

/// The response schema constraining the generator's output: an array of
/// objects with exactly the six entry fields, day/time pinned to the fixed
/// enumerations.
fn response_schema() -> Value {
    let days: Vec<&str> = Day::ALL.iter().map(Day::as_str).collect();
    let slots: Vec<&str> = TimeSlot::ALL.iter().map(TimeSlot::as_str).collect();
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "day": { "type": "STRING", "enum": days },
                "time": { "type": "STRING", "enum": slots },
                "groupId": { "type": "STRING" },
                "subjectId": { "type": "STRING" },
                "facultyId": { "type": "STRING" },
                "roomId": { "type": "STRING" },
            },
            "required": ["day", "time", "groupId", "subjectId", "facultyId", "roomId"],
        },
    })
}

fn build_request_body(
    request: &GenerationRequest,
    tuning: &GeneratorTuning,
) -> serde_json::Result<Value> {
    let mut generation_config = json!({
        "responseMimeType": "application/json",
        "responseSchema": response_schema(),
    });
    if let Some(temperature) = tuning.temperature {
        generation_config["temperature"] = json!(temperature);
    }
    if let Some(budget) = tuning.thinking_budget {
        generation_config["thinkingConfig"] = json!({ "thinkingBudget": budget });
    }

    Ok(json!({
        "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
        "contents": [{ "parts": [{ "text": render_prompt(request)? }] }],
        "generationConfig": generation_config,
    }))
}

/// Render the data-plus-constraints prompt for one run. The availability in
/// `facultyAssignments` is already leave-adjusted; an empty day means the
/// member is unavailable that day.
fn render_prompt(request: &GenerationRequest) -> serde_json::Result<String> {
    Ok(format!(
        "DATA:\n\
         1. Classrooms: {}\n\
         2. Subjects: {}\n\
         3. Student Groups: {}\n\
         4. Faculty Assignments & Availability (NOTE: This availability data has been pre-processed to account for approved leaves. An empty array for a day means the faculty is unavailable): {}\n\
         5. Time Slots: {}\n\
         6. Days: {}\n\
         \n\
         CONSTRAINTS:\n{}",
        serde_json::to_string(&request.classrooms)?,
        serde_json::to_string(&request.subjects)?,
        serde_json::to_string(&request.student_groups)?,
        serde_json::to_string(&request.faculty_assignments)?,
        serde_json::to_string(&request.time_slots)?,
        serde_json::to_string(&request.days)?,
        request.constraint_text,
    ))
}

/// Pull the generated text out of the response envelope.
fn extract_response_text(payload: &Value) -> Result<String, GeneratorError> {
    payload
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| {
            GeneratorError::Service("response contains no candidate text".to_string())
        })
}
