//! End-to-end flows across generation, publication, and the request
//! lifecycle: a draft becomes the published timetable, requests are filed
//! and resolved against it, and regeneration invalidates stale swaps.

mod support;

use std::time::Duration;

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

use intellischedule::api::{
    Day, LeaveRequest, LeaveType, RequestId, RequestStatus, Role, TimeSlot, UserId,
};
use intellischedule::generator::GenerationProfile;
use intellischedule::services::generation::generate_draft;
use intellischedule::services::lifecycle::{
    self, Decision, LifecycleError,
};
use intellischedule::services::resolve_availability;
use intellischedule::store::{CatalogStore, RequestStore, TimetableStore};

use support::{seeded_store, user, valid_schedule_json, ScriptedGenerator};

const DEADLINE: Duration = Duration::from_secs(5);

async fn generate_and_publish(store: &intellischedule::store::LocalStore) {
    let generator = ScriptedGenerator::returning(valid_schedule_json());
    generate_draft(
        store,
        &generator,
        GenerationProfile::Balanced,
        None,
        DEADLINE,
        CancellationToken::new(),
    )
    .await
    .unwrap();
    let admin = user("admin", "Admin", Role::Admin);
    lifecycle::publish_draft(store, &admin).await.unwrap();
}

#[tokio::test]
async fn generated_draft_publishes_and_supports_swaps() {
    let store = seeded_store().await;
    generate_and_publish(&store).await;

    let published = store.published().await.unwrap().unwrap();
    assert_eq!(published.len(), 7);
    assert!(store.draft().await.unwrap().is_none());

    // Dr. Sharma swaps their Monday Mathematics slot with one of Prof.
    // Iyer's Data Structures slots.
    let mine = published
        .entries
        .iter()
        .find(|e| e.faculty_id == UserId::from("u2") && e.day == Day::Monday)
        .unwrap()
        .clone();
    let theirs = published
        .entries
        .iter()
        .find(|e| e.faculty_id == UserId::from("u4") && e.day == Day::Friday)
        .unwrap()
        .clone();

    let sharma = user("u2", "Dr. Sharma", Role::Faculty);
    let filed = lifecycle::submit_swap_request(
        &store,
        &sharma,
        mine.id.clone(),
        theirs.id.clone(),
        "Department meeting".to_string(),
    )
    .await
    .unwrap();
    assert_eq!(filed.status, RequestStatus::Pending);
    assert_eq!(filed.their_faculty_id, UserId::from("u4"));

    let admin = user("admin", "Admin", Role::Admin);
    lifecycle::resolve_swap_request(&store, &admin, &filed.id, Decision::Approve)
        .await
        .unwrap();

    let after = store.published().await.unwrap().unwrap();
    assert_eq!(after.entry(&mine.id).unwrap().faculty_id, UserId::from("u4"));
    assert_eq!(after.entry(&theirs.id).unwrap().faculty_id, UserId::from("u2"));
    // Slots and subjects did not move, only the faculty ids did.
    assert_eq!(after.entry(&mine.id).unwrap().subject_id, mine.subject_id);
    assert_eq!(after.entry(&theirs.id).unwrap().time, theirs.time);
}

#[tokio::test]
async fn republishing_invalidates_pending_swaps() {
    let store = seeded_store().await;
    generate_and_publish(&store).await;

    let published = store.published().await.unwrap().unwrap();
    let mine = published
        .entries
        .iter()
        .find(|e| e.faculty_id == UserId::from("u2"))
        .unwrap()
        .clone();
    let theirs = published
        .entries
        .iter()
        .find(|e| e.faculty_id == UserId::from("u4"))
        .unwrap()
        .clone();

    let sharma = user("u2", "Dr. Sharma", Role::Faculty);
    let filed = lifecycle::submit_swap_request(
        &store,
        &sharma,
        mine.id.clone(),
        theirs.id.clone(),
        "reason".to_string(),
    )
    .await
    .unwrap();

    // A fresh generation run mints new entry ids, then replaces the
    // published timetable.
    generate_and_publish(&store).await;

    let admin = user("admin", "Admin", Role::Admin);
    let err = lifecycle::resolve_swap_request(&store, &admin, &filed.id, Decision::Approve)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::EntryNotFound(_)));
    assert_eq!(
        store.swap_request(&filed.id).await.unwrap().unwrap().status,
        RequestStatus::Pending
    );
}

#[tokio::test]
async fn approved_multi_day_leave_blanks_both_days() {
    let store = seeded_store().await;

    // Monday 2024-10-07 through Tuesday 2024-10-08.
    let sharma = user("u2", "Dr. Sharma", Role::Faculty);
    let filed = lifecycle::submit_leave_request(
        &store,
        &sharma,
        LeaveRequest {
            id: RequestId::from("ignored"),
            faculty_id: UserId::from("u2"),
            start_date: NaiveDate::from_ymd_opt(2024, 10, 7).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 10, 8).unwrap(),
            reason: "Wedding".to_string(),
            status: RequestStatus::Pending,
            leave_type: LeaveType::MultiDay,
            half_day_session: None,
        },
    )
    .await
    .unwrap();

    // Pending leave has no effect yet.
    let member = store
        .faculty_by_id(&UserId::from("u2"))
        .await
        .unwrap()
        .unwrap();
    let pending = store.leave_requests().await.unwrap();
    let availability = resolve_availability(&member, &pending);
    assert_eq!(availability[&Day::Monday].len(), TimeSlot::ALL.len());

    let principal = user("principal", "Principal", Role::Principal);
    lifecycle::resolve_leave_request(&store, &principal, &filed.id, Decision::Approve)
        .await
        .unwrap();

    let approved = store.leave_requests().await.unwrap();
    let availability = resolve_availability(&member, &approved);
    assert!(availability[&Day::Monday].is_empty());
    assert!(availability[&Day::Tuesday].is_empty());
    assert_eq!(availability[&Day::Wednesday].len(), TimeSlot::ALL.len());
}

#[tokio::test]
async fn half_day_leave_keeps_the_other_session() {
    let store = seeded_store().await;

    let sharma = user("u2", "Dr. Sharma", Role::Faculty);
    let filed = lifecycle::submit_leave_request(
        &store,
        &sharma,
        LeaveRequest {
            id: RequestId::from("ignored"),
            faculty_id: UserId::from("u2"),
            start_date: NaiveDate::from_ymd_opt(2024, 10, 9).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 10, 9).unwrap(),
            reason: "Appointment".to_string(),
            status: RequestStatus::Pending,
            leave_type: LeaveType::HalfDay,
            half_day_session: Some(intellischedule::api::HalfDaySession::FirstHalf),
        },
    )
    .await
    .unwrap();
    let principal = user("principal", "Principal", Role::Principal);
    lifecycle::resolve_leave_request(&store, &principal, &filed.id, Decision::Approve)
        .await
        .unwrap();

    let member = store
        .faculty_by_id(&UserId::from("u2"))
        .await
        .unwrap()
        .unwrap();
    let approved = store.leave_requests().await.unwrap();
    let availability = resolve_availability(&member, &approved);

    // Wednesday keeps only the afternoon slots.
    let wednesday = &availability[&Day::Wednesday];
    assert_eq!(wednesday.len(), 3);
    assert!(!wednesday.contains(&TimeSlot::T0900));
    assert!(wednesday.contains(&TimeSlot::T1400));
}

#[tokio::test]
async fn leave_submission_rejects_invalid_date_ranges() {
    let store = seeded_store().await;
    let sharma = user("u2", "Dr. Sharma", Role::Faculty);

    let err = lifecycle::submit_leave_request(
        &store,
        &sharma,
        LeaveRequest {
            id: RequestId::from("ignored"),
            faculty_id: UserId::from("u2"),
            start_date: NaiveDate::from_ymd_opt(2024, 10, 9).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 10, 8).unwrap(),
            reason: "bad range".to_string(),
            status: RequestStatus::Pending,
            leave_type: LeaveType::MultiDay,
            half_day_session: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LifecycleError::Invalid(_)));
    assert!(store.leave_requests().await.unwrap().is_empty());
}
