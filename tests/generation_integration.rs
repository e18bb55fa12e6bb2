//! Integration tests for the generation orchestrator: contract enforcement,
//! constraint gating, deadline and cancellation behavior against a seeded
//! store and scripted generators.

mod support;

use std::time::Duration;

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

use intellischedule::api::{LeaveRequest, LeaveType, RequestId, RequestStatus, UserId};
use intellischedule::generator::{GenerationProfile, GeneratorError};
use intellischedule::services::constraints::ConstraintRule;
use intellischedule::services::generation::{generate_draft, GenerationError};
use intellischedule::store::{RequestStore, TimetableStore};

use support::{seeded_store, valid_schedule_json, HangingGenerator, ScriptedGenerator};

const DEADLINE: Duration = Duration::from_secs(5);

#[tokio::test]
async fn accepted_schedule_becomes_the_draft() {
    let store = seeded_store().await;
    let generator = ScriptedGenerator::returning(valid_schedule_json());

    let count = generate_draft(
        &store,
        &generator,
        GenerationProfile::Balanced,
        None,
        DEADLINE,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(count, 7);
    let draft = store.draft().await.unwrap().unwrap();
    assert_eq!(draft.len(), 7);
    // Every entry got a stable id.
    assert!(draft.entries.iter().all(|e| !e.id.value().is_empty()));

    // The request carried the whole catalog and the fixed grid.
    let request = generator.last_request.lock().take().unwrap();
    assert_eq!(request.classrooms.len(), 2);
    assert_eq!(request.subjects.len(), 2);
    assert_eq!(request.faculty_assignments.len(), 2);
    assert_eq!(request.time_slots.len(), 6);
    assert_eq!(request.days.len(), 5);
}

#[tokio::test]
async fn additional_constraints_reach_the_generator() {
    let store = seeded_store().await;
    let generator = ScriptedGenerator::returning(valid_schedule_json());

    generate_draft(
        &store,
        &generator,
        GenerationProfile::Speed,
        Some("No classes after lunch on Friday"),
        DEADLINE,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let request = generator.last_request.lock().take().unwrap();
    assert!(request
        .constraint_text
        .contains("No classes after lunch on Friday"));
    // Speed profile switched thinking off.
    let tuning = generator.last_tuning.lock().take().unwrap();
    assert_eq!(tuning.thinking_budget, Some(0));
}

#[tokio::test]
async fn accuracy_tuning_survives_into_the_bounded_call() {
    let store = seeded_store().await;
    let generator = ScriptedGenerator::returning(valid_schedule_json());

    generate_draft(
        &store,
        &generator,
        GenerationProfile::Accuracy,
        None,
        DEADLINE,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let tuning = generator.last_tuning.lock().take().unwrap();
    assert_eq!(tuning.temperature, Some(0.2));
    assert_eq!(tuning.thinking_budget, None);
}

#[tokio::test]
async fn error_envelope_leaves_previous_draft_untouched() {
    let store = seeded_store().await;

    // Establish a known-good draft first.
    let generator = ScriptedGenerator::returning(valid_schedule_json());
    generate_draft(
        &store,
        &generator,
        GenerationProfile::Balanced,
        None,
        DEADLINE,
        CancellationToken::new(),
    )
    .await
    .unwrap();
    let before = store.draft().await.unwrap().unwrap();

    // The service sometimes answers with an error object instead of the
    // schedule array.
    let generator = ScriptedGenerator::returning(r#"{"error": "quota exceeded"}"#);
    let err = generate_draft(
        &store,
        &generator,
        GenerationProfile::Balanced,
        None,
        DEADLINE,
        CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, GenerationError::Contract(_)));
    assert_eq!(store.draft().await.unwrap().unwrap(), before);
}

#[tokio::test]
async fn clashing_schedule_is_rejected_by_validation() {
    let store = seeded_store().await;

    // Both groups in the same room at the same time.
    let text = r#"[
        {"day": "Monday", "time": "09:00 - 10:00", "groupId": "g1", "subjectId": "s1", "facultyId": "u2", "roomId": "c1"},
        {"day": "Monday", "time": "09:00 - 10:00", "groupId": "g2", "subjectId": "s2", "facultyId": "u4", "roomId": "c1"}
    ]"#;
    let generator = ScriptedGenerator::returning(text);
    let err = generate_draft(
        &store,
        &generator,
        GenerationProfile::Balanced,
        None,
        DEADLINE,
        CancellationToken::new(),
    )
    .await
    .unwrap_err();

    let GenerationError::ConstraintViolations(report) = err else {
        panic!("expected constraint violations, got {err:?}");
    };
    assert!(report
        .violations
        .iter()
        .any(|v| v.rule == ConstraintRule::DoubleBooking));
    assert!(store.draft().await.unwrap().is_none());
}

#[tokio::test]
async fn approved_leave_makes_scheduled_day_a_violation() {
    let store = seeded_store().await;

    // Prof. Iyer (u4) is on approved leave on Monday 2024-10-07.
    store
        .add_leave_request(LeaveRequest {
            id: RequestId::from("lr1"),
            faculty_id: UserId::from("u4"),
            start_date: NaiveDate::from_ymd_opt(2024, 10, 7).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 10, 7).unwrap(),
            reason: "Conference".to_string(),
            status: RequestStatus::Approved,
            leave_type: LeaveType::FullDay,
            half_day_session: None,
        })
        .await
        .unwrap();

    // The scripted schedule still places u4 on Monday.
    let generator = ScriptedGenerator::returning(valid_schedule_json());
    let err = generate_draft(
        &store,
        &generator,
        GenerationProfile::Balanced,
        None,
        DEADLINE,
        CancellationToken::new(),
    )
    .await
    .unwrap_err();

    let GenerationError::ConstraintViolations(report) = err else {
        panic!("expected constraint violations, got {err:?}");
    };
    assert!(report
        .violations
        .iter()
        .any(|v| v.rule == ConstraintRule::AvailabilityCompliance));

    // The blackout also reached the generator's view of u4.
    let request = generator.last_request.lock().take().unwrap();
    let u4 = request
        .faculty_assignments
        .iter()
        .find(|f| f.id == UserId::from("u4"))
        .unwrap();
    assert!(u4.availability[&intellischedule::api::Day::Monday].is_empty());
}

#[tokio::test]
async fn generator_failure_is_propagated() {
    let store = seeded_store().await;
    let generator =
        ScriptedGenerator::failing(GeneratorError::Service("backend overloaded".to_string()));

    let err = generate_draft(
        &store,
        &generator,
        GenerationProfile::Balanced,
        None,
        DEADLINE,
        CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        GenerationError::Generator(GeneratorError::Service(_))
    ));
    assert!(store.draft().await.unwrap().is_none());
}

#[tokio::test]
async fn run_times_out_at_the_deadline() {
    let store = seeded_store().await;

    let err = generate_draft(
        &store,
        &HangingGenerator,
        GenerationProfile::Balanced,
        None,
        Duration::from_millis(50),
        CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        GenerationError::Generator(GeneratorError::Timeout(_))
    ));
}

#[tokio::test]
async fn cancellation_aborts_the_run() {
    let store = seeded_store().await;
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = generate_draft(
        &store,
        &HangingGenerator,
        GenerationProfile::Balanced,
        None,
        DEADLINE,
        cancel,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        GenerationError::Generator(GeneratorError::Cancelled)
    ));
    assert!(store.draft().await.unwrap().is_none());
}
