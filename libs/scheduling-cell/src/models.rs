// libs/scheduling-cell/src/models.rs
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use meeting_cell::Meeting;

/// Sessions are fixed-length; the server enforces this regardless of any
/// client-supplied duration.
pub const SLOT_DURATION_MIN: i32 = 30;

// ==============================================================================
// AVAILABILITY MODELS
// ==============================================================================

/// One bookable time-of-day range, UTC, recurring weekly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(with = "hhmm")]
    pub from: NaiveTime,
    #[serde(with = "hhmm")]
    pub to: NaiveTime,
}

impl TimeWindow {
    pub fn validate(&self) -> Result<(), SchedulingError> {
        if self.from >= self.to {
            return Err(SchedulingError::Validation(format!(
                "Availability window start {} must be before end {}",
                self.from.format("%H:%M"),
                self.to.format("%H:%M")
            )));
        }
        Ok(())
    }
}

/// Weekly recurring availability, keyed by weekday. Times are UTC `HH:MM`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAvailability {
    #[serde(default)]
    pub mon: Vec<TimeWindow>,
    #[serde(default)]
    pub tue: Vec<TimeWindow>,
    #[serde(default)]
    pub wed: Vec<TimeWindow>,
    #[serde(default)]
    pub thu: Vec<TimeWindow>,
    #[serde(default)]
    pub fri: Vec<TimeWindow>,
    #[serde(default)]
    pub sat: Vec<TimeWindow>,
    #[serde(default)]
    pub sun: Vec<TimeWindow>,
}

impl WeeklyAvailability {
    pub fn windows_for(&self, weekday: Weekday) -> &[TimeWindow] {
        match weekday {
            Weekday::Mon => &self.mon,
            Weekday::Tue => &self.tue,
            Weekday::Wed => &self.wed,
            Weekday::Thu => &self.thu,
            Weekday::Fri => &self.fri,
            Weekday::Sat => &self.sat,
            Weekday::Sun => &self.sun,
        }
    }

    fn days(&self) -> [(&'static str, &[TimeWindow]); 7] {
        [
            ("mon", self.mon.as_slice()),
            ("tue", self.tue.as_slice()),
            ("wed", self.wed.as_slice()),
            ("thu", self.thu.as_slice()),
            ("fri", self.fri.as_slice()),
            ("sat", self.sat.as_slice()),
            ("sun", self.sun.as_slice()),
        ]
    }

    /// Enforced when a therapist publishes availability: every window must
    /// have `from < to`, and windows for the same day must not overlap.
    /// Touching windows (one ends exactly where the next starts) are allowed.
    pub fn validate(&self) -> Result<(), SchedulingError> {
        for (day, windows) in self.days() {
            for window in windows {
                window.validate()?;
            }

            let mut sorted: Vec<&TimeWindow> = windows.iter().collect();
            sorted.sort_by_key(|w| w.from);
            for pair in sorted.windows(2) {
                if pair[1].from < pair[0].to {
                    return Err(SchedulingError::Validation(format!(
                        "Overlapping availability windows on {}: {}-{} and {}-{}",
                        day,
                        pair[0].from.format("%H:%M"),
                        pair[0].to.format("%H:%M"),
                        pair[1].from.format("%H:%M"),
                        pair[1].to.format("%H:%M")
                    )));
                }
            }
        }
        Ok(())
    }

    /// Whether `[start, end)` lies entirely inside one window for that
    /// weekday. Intervals crossing midnight are never contained.
    pub fn contains(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        if start.date_naive() != end.date_naive() {
            return false;
        }

        let start_time = start.time();
        let end_time = end.time();

        self.windows_for(start.weekday())
            .iter()
            .any(|w| start_time >= w.from && end_time <= w.to)
    }
}

/// Serialize/deserialize `NaiveTime` as the published `HH:MM` format.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&value, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Published profile of a bookable therapist. Owned and mutated only by the
/// therapist themselves (or an administrator acting on their behalf).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TherapistProfile {
    pub therapist_id: Uuid,
    /// Host identity in the upstream video service, if the therapist has one.
    pub meeting_host_id: Option<String>,
    /// IANA timezone, stored for future use; all scheduling is UTC for v1.
    pub timezone: String,
    pub specialties: Vec<String>,
    pub bio: String,
    pub availability: WeeklyAvailability,
    pub is_accepting: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==============================================================================
// APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Confirmed,
    Cancelled,
    Completed,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub therapist_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    /// Chat-room key for the session, consumed by the realtime layer.
    pub space_key: String,
    pub notes: String,
    pub meeting_id: Option<String>,
    pub meeting_join_url: Option<String>,
    pub meeting_start_url: Option<String>,
    pub meeting_password: Option<String>,
    pub session_logs: Option<String>,
    pub prescription: Option<Prescription>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<Uuid>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Construct a freshly booked appointment in `confirmed` status with the
    /// fixed session length and the provisioned meeting resource attached.
    pub fn new(
        patient_id: Uuid,
        therapist_id: Uuid,
        start_time: DateTime<Utc>,
        notes: String,
        meeting: &Meeting,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            patient_id,
            therapist_id,
            start_time,
            duration_minutes: SLOT_DURATION_MIN,
            status: AppointmentStatus::Confirmed,
            space_key: make_space_key(therapist_id, patient_id),
            notes,
            meeting_id: Some(meeting.id.clone()),
            meeting_join_url: Some(meeting.join_url.clone()),
            meeting_start_url: Some(meeting.start_url.clone()),
            meeting_password: meeting.password.clone(),
            session_logs: None,
            prescription: None,
            completed_at: None,
            completed_by: None,
            cancelled_at: None,
            cancelled_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + chrono::Duration::minutes(self.duration_minutes as i64)
    }
}

pub fn make_space_key(therapist_id: Uuid, patient_id: Uuid) -> String {
    format!("space:t:{}:p:{}", therapist_id, patient_id)
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertTherapistProfileRequest {
    pub meeting_host_id: Option<String>,
    pub timezone: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub bio: Option<String>,
    pub availability: Option<WeeklyAvailability>,
    pub is_accepting: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub therapist_id: Uuid,
    pub start_time: DateTime<Utc>,
    /// Accepted for API compatibility; the server always books 30 minutes.
    pub duration_minutes: Option<i32>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteAppointmentRequest {
    pub logs: Option<String>,
    pub prescription_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub therapist_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsResponse {
    pub slots: Vec<DateTime<Utc>>,
}

/// Public directory entry for an accepting therapist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TherapistDirectoryEntry {
    pub therapist_id: Uuid,
    pub specialties: Vec<String>,
    pub bio: String,
    pub availability: WeeklyAvailability,
    pub timezone: String,
    pub is_accepting: bool,
}

impl From<&TherapistProfile> for TherapistDirectoryEntry {
    fn from(profile: &TherapistProfile) -> Self {
        Self {
            therapist_id: profile.therapist_id,
            specialties: profile.specialties.clone(),
            bio: profile.bio.clone(),
            availability: profile.availability.clone(),
            timezone: profile.timezone.clone(),
            is_accepting: profile.is_accepting,
        }
    }
}

// ==============================================================================
// EVENTS
// ==============================================================================

/// Broadcast after a booking commit succeeds. Delivery is decoupled from the
/// transactional boundary; a missing subscriber never rolls back a booking.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulingEvent {
    AppointmentCreated { appointment: Appointment },
    AppointmentCancelled { appointment: Appointment },
    AppointmentCompleted { appointment: Appointment },
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum SchedulingError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Therapist not found")]
    TherapistNotFound,

    #[error("Therapist profile not found")]
    ProfileNotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Requested time conflicts with an existing appointment")]
    Conflict,

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("Not authorized for this appointment")]
    Forbidden,

    #[error("Meeting provisioning failed: {0}")]
    MeetingProvisioning(String),
}
