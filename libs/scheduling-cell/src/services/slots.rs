// libs/scheduling-cell/src/services/slots.rs
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::models::{Appointment, SchedulingError, TimeWindow, SLOT_DURATION_MIN};
use crate::services::conflict::ConflictDetector;
use crate::store::SchedulingStore;

/// Derives the bookable 30-minute slots for a therapist on a given day from
/// their weekly availability minus already-booked time.
pub struct SlotGenerator {
    store: Arc<SchedulingStore>,
    conflict: ConflictDetector,
}

impl SlotGenerator {
    pub fn new(store: Arc<SchedulingStore>) -> Self {
        Self {
            store,
            conflict: ConflictDetector::new(),
        }
    }

    /// Free slot start times for one UTC calendar day, in window order then
    /// chronological within each window.
    ///
    /// A therapist who is not accepting bookings yields an empty list, not an
    /// error; an unknown therapist is an error.
    pub async fn free_slots(
        &self,
        therapist_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<DateTime<Utc>>, SchedulingError> {
        let profile = self
            .store
            .get_profile(therapist_id)
            .await
            .ok_or(SchedulingError::TherapistNotFound)?;

        if !profile.is_accepting {
            debug!(%therapist_id, "therapist not accepting bookings, no slots");
            return Ok(Vec::new());
        }

        let booked = self.store.appointments_for_day(therapist_id, date).await;
        let windows = profile.availability.windows_for(date.weekday());

        Ok(self.slots_for_windows(windows, date, &booked))
    }

    fn slots_for_windows(
        &self,
        windows: &[TimeWindow],
        date: NaiveDate,
        booked: &[Appointment],
    ) -> Vec<DateTime<Utc>> {
        let step = Duration::minutes(SLOT_DURATION_MIN as i64);
        let mut slots = Vec::new();

        for window in windows {
            let window_end = date.and_time(window.to).and_utc();
            let mut current = date.and_time(window.from).and_utc();

            // Step from the window start; a trailing remainder shorter than
            // one session is unusable.
            while current + step <= window_end {
                let slot_end = current + step;
                if self.conflict.find_conflict(current, slot_end, booked).is_none() {
                    slots.push(current);
                }
                current = slot_end;
            }
        }

        slots
    }
}
