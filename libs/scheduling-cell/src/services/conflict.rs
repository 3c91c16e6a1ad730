// libs/scheduling-cell/src/services/conflict.rs
use chrono::{DateTime, Utc};

use crate::models::{Appointment, AppointmentStatus};

/// Pure interval-overlap checks against a candidate set of appointments.
/// Cancelled appointments never block a slot.
#[derive(Default)]
pub struct ConflictDetector;

impl ConflictDetector {
    pub fn new() -> Self {
        Self
    }

    /// Half-open interval overlap: back-to-back sessions do not conflict.
    pub fn overlaps(
        a_start: DateTime<Utc>,
        a_end: DateTime<Utc>,
        b_start: DateTime<Utc>,
        b_end: DateTime<Utc>,
    ) -> bool {
        a_start < b_end && b_start < a_end
    }

    /// First blocking appointment for the proposed `[start, end)` interval,
    /// if any.
    pub fn find_conflict<'a>(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        appointments: &'a [Appointment],
    ) -> Option<&'a Appointment> {
        appointments.iter().find(|a| {
            a.status != AppointmentStatus::Cancelled
                && Self::overlaps(start, end, a.start_time, a.end_time())
        })
    }
}
