// libs/scheduling-cell/tests/availability_test.rs
mod common;

use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;

use common::*;
use scheduling_cell::services::AvailabilityService;
use scheduling_cell::{
    SchedulingError, UpsertTherapistProfileRequest, WeeklyAvailability,
};

fn upsert_request(availability: WeeklyAvailability) -> UpsertTherapistProfileRequest {
    UpsertTherapistProfileRequest {
        meeting_host_id: Some("host@example.test".to_string()),
        timezone: None,
        specialties: Some(vec!["cbt".to_string()]),
        bio: Some("CBT specialist".to_string()),
        availability: Some(availability),
        is_accepting: None,
    }
}

#[test]
fn windows_round_trip_as_hhmm_strings() {
    let availability = monday_availability(vec![window("09:00", "12:30")]);

    let value = serde_json::to_value(&availability).unwrap();
    assert_eq!(value["mon"], json!([{ "from": "09:00", "to": "12:30" }]));

    let parsed: WeeklyAvailability = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, availability);
}

#[test]
fn missing_days_default_to_empty() {
    let parsed: WeeklyAvailability =
        serde_json::from_value(json!({ "fri": [{ "from": "08:00", "to": "10:00" }] })).unwrap();
    assert_eq!(parsed.fri.len(), 1);
    assert!(parsed.mon.is_empty());
    assert!(parsed.sun.is_empty());
}

#[test]
fn inverted_window_fails_validation() {
    let availability = monday_availability(vec![window("12:00", "09:00")]);
    assert_matches!(availability.validate(), Err(SchedulingError::Validation(_)));
}

#[test]
fn overlapping_windows_fail_validation_regardless_of_order() {
    let availability =
        monday_availability(vec![window("10:30", "12:00"), window("09:00", "11:00")]);
    assert_matches!(availability.validate(), Err(SchedulingError::Validation(_)));
}

#[test]
fn touching_windows_are_valid() {
    let availability =
        monday_availability(vec![window("09:00", "11:00"), window("11:00", "13:00")]);
    assert!(availability.validate().is_ok());
}

#[test]
fn containment_is_per_window_not_across_windows() {
    let availability =
        monday_availability(vec![window("09:00", "11:00"), window("11:00", "13:00")]);

    // 10:45-11:15 straddles the window boundary and is not bookable.
    assert!(!availability.contains(at(monday(), "10:45"), at(monday(), "11:15")));
    assert!(availability.contains(at(monday(), "10:30"), at(monday(), "11:00")));
    assert!(availability.contains(at(monday(), "11:00"), at(monday(), "11:30")));
}

#[test]
fn intervals_crossing_midnight_are_never_contained() {
    let availability = monday_availability(vec![window("09:00", "23:59")]);

    let start = at(monday(), "23:45");
    let end = start + chrono::Duration::minutes(30);
    assert!(!availability.contains(start, end));
}

#[tokio::test]
async fn upsert_applies_defaults() {
    let state = test_state(StubProvisioner::ok());
    let service = AvailabilityService::new(state.store.clone());
    let therapist_id = Uuid::new_v4();

    let profile = service
        .upsert_profile(
            therapist_id,
            upsert_request(monday_availability(vec![window("09:00", "12:00")])),
        )
        .await
        .unwrap();

    assert_eq!(profile.timezone, "UTC");
    assert!(profile.is_accepting);
    assert_eq!(profile.therapist_id, therapist_id);
}

#[tokio::test]
async fn rejected_upsert_leaves_previous_profile_intact() {
    let state = test_state(StubProvisioner::ok());
    let service = AvailabilityService::new(state.store.clone());
    let therapist_id = Uuid::new_v4();

    service
        .upsert_profile(
            therapist_id,
            upsert_request(monday_availability(vec![window("09:00", "12:00")])),
        )
        .await
        .unwrap();

    let result = service
        .upsert_profile(
            therapist_id,
            upsert_request(monday_availability(vec![
                window("09:00", "11:00"),
                window("10:00", "12:00"),
            ])),
        )
        .await;
    assert_matches!(result, Err(SchedulingError::Validation(_)));

    let stored = service.get_profile(therapist_id).await.unwrap();
    assert_eq!(stored.availability.mon, vec![window("09:00", "12:00")]);
}

#[tokio::test]
async fn directory_hides_non_accepting_therapists() {
    let state = test_state(StubProvisioner::ok());
    let service = AvailabilityService::new(state.store.clone());

    let accepting = Uuid::new_v4();
    let paused = Uuid::new_v4();
    state
        .store
        .upsert_profile(profile(
            accepting,
            monday_availability(vec![window("09:00", "12:00")]),
            true,
        ))
        .await;
    state
        .store
        .upsert_profile(profile(
            paused,
            monday_availability(vec![window("09:00", "12:00")]),
            false,
        ))
        .await;

    let directory = service.list_therapists().await;
    assert_eq!(directory.len(), 1);
    assert_eq!(directory[0].therapist_id, accepting);
}

#[tokio::test]
async fn profile_lookup_for_unknown_therapist_fails() {
    let state = test_state(StubProvisioner::ok());
    let service = AvailabilityService::new(state.store.clone());

    let result = service.get_profile(Uuid::new_v4()).await;
    assert_matches!(result, Err(SchedulingError::ProfileNotFound));
}
