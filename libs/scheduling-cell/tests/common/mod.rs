// Shared fixtures for scheduling-cell integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use meeting_cell::{CreateMeetingRequest, Meeting, MeetingError, MeetingProvisioner};
use scheduling_cell::{SchedulingState, TherapistProfile, TimeWindow, WeeklyAvailability};
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

/// Test double for the meeting boundary: either hands out a canned meeting
/// or fails every call, and counts how often it was asked.
pub struct StubProvisioner {
    fail: bool,
    calls: AtomicUsize,
}

impl StubProvisioner {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MeetingProvisioner for StubProvisioner {
    async fn create_meeting(
        &self,
        _request: CreateMeetingRequest,
    ) -> Result<Meeting, MeetingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MeetingError::ApiError {
                status: 503,
                message: "meeting service unavailable".to_string(),
            });
        }
        Ok(Meeting {
            id: "987654321".to_string(),
            join_url: "https://meetings.example.test/j/987654321".to_string(),
            start_url: "https://meetings.example.test/s/987654321".to_string(),
            password: Some("abc123".to_string()),
        })
    }
}

pub fn test_state(provisioner: Arc<dyn MeetingProvisioner>) -> SchedulingState {
    SchedulingState::new(TestConfig::default().to_arc(), provisioner)
}

pub fn auth_token(user: &TestUser) -> String {
    JwtTestUtils::create_test_token(user, &TestConfig::default().jwt_secret, None)
}

/// Fixed Monday so expected slot instants are stable across runs.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2029, 1, 1).unwrap()
}

pub fn window(from: &str, to: &str) -> TimeWindow {
    TimeWindow {
        from: NaiveTime::parse_from_str(from, "%H:%M").unwrap(),
        to: NaiveTime::parse_from_str(to, "%H:%M").unwrap(),
    }
}

pub fn monday_availability(windows: Vec<TimeWindow>) -> WeeklyAvailability {
    WeeklyAvailability {
        mon: windows,
        ..Default::default()
    }
}

pub fn profile(
    therapist_id: Uuid,
    availability: WeeklyAvailability,
    is_accepting: bool,
) -> TherapistProfile {
    let now = Utc::now();
    TherapistProfile {
        therapist_id,
        meeting_host_id: Some("host@example.test".to_string()),
        timezone: "UTC".to_string(),
        specialties: vec!["cbt".to_string()],
        bio: "Test therapist".to_string(),
        availability,
        is_accepting,
        created_at: now,
        updated_at: now,
    }
}

pub fn at(date: NaiveDate, time: &str) -> DateTime<Utc> {
    date.and_time(NaiveTime::parse_from_str(time, "%H:%M").unwrap())
        .and_utc()
}
