// libs/scheduling-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use meeting_cell::{CreateMeetingRequest, MeetingProvisioner};

use crate::models::{
    Appointment, BookAppointmentRequest, SchedulingError, SchedulingEvent, SLOT_DURATION_MIN,
};
use crate::services::conflict::ConflictDetector;
use crate::store::SchedulingStore;

/// Orchestrates the booking flow: validate, detect conflicts, provision the
/// video meeting, persist, and announce.
///
/// The check-then-insert sequence runs under the store's per-therapist lock,
/// so two requests racing for the same slot resolve to exactly one booking.
/// Bookings against different therapists proceed in parallel.
pub struct BookingCoordinator {
    store: Arc<SchedulingStore>,
    provisioner: Arc<dyn MeetingProvisioner>,
    conflict: ConflictDetector,
    events: broadcast::Sender<SchedulingEvent>,
}

impl BookingCoordinator {
    pub fn new(
        store: Arc<SchedulingStore>,
        provisioner: Arc<dyn MeetingProvisioner>,
        events: broadcast::Sender<SchedulingEvent>,
    ) -> Self {
        Self {
            store,
            provisioner,
            conflict: ConflictDetector::new(),
            events,
        }
    }

    pub async fn book(
        &self,
        patient_id: Uuid,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        // Fixed session length; any client-supplied duration is ignored.
        let start = request.start_time;
        let end = start + Duration::minutes(SLOT_DURATION_MIN as i64);

        let lock = self.store.booking_lock(request.therapist_id).await;
        let _guard = lock.lock().await;

        // Everything below runs serialized per therapist, so the profile and
        // conflict checks cannot be invalidated before the insert. A
        // therapist without a published profile is not bookable.
        let profile = self
            .store
            .get_profile(request.therapist_id)
            .await
            .ok_or_else(|| {
                SchedulingError::Validation("Therapist not available".to_string())
            })?;

        if !profile.is_accepting {
            return Err(SchedulingError::Validation(
                "Therapist is not accepting appointments".to_string(),
            ));
        }

        if !profile.availability.contains(start, end) {
            return Err(SchedulingError::Validation(
                "Requested time is outside therapist availability".to_string(),
            ));
        }

        let booked = self
            .store
            .appointments_for_day(request.therapist_id, start.date_naive())
            .await;
        if let Some(existing) = self.conflict.find_conflict(start, end, &booked) {
            warn!(
                therapist_id = %request.therapist_id,
                conflicting_appointment = %existing.id,
                %start,
                "booking rejected: slot already taken"
            );
            return Err(SchedulingError::Conflict);
        }

        // Provision before persisting: a provisioning failure must leave no
        // appointment record behind.
        let meeting = self
            .provisioner
            .create_meeting(CreateMeetingRequest {
                host_id: profile.meeting_host_id.clone(),
                topic: format!("Therapy session t:{} p:{}", request.therapist_id, patient_id),
                start_time: start,
                duration_minutes: SLOT_DURATION_MIN,
                timezone: "UTC".to_string(),
            })
            .await
            .map_err(|e| {
                warn!(therapist_id = %request.therapist_id, error = %e, "meeting provisioning failed");
                SchedulingError::MeetingProvisioning(e.to_string())
            })?;

        let appointment = Appointment::new(
            patient_id,
            request.therapist_id,
            start,
            request.note.unwrap_or_default(),
            &meeting,
        );
        self.store.insert_appointment(appointment.clone()).await;

        info!(
            appointment_id = %appointment.id,
            therapist_id = %appointment.therapist_id,
            patient_id = %appointment.patient_id,
            %start,
            "appointment booked"
        );

        // Post-commit announcement; no subscriber is not a failure.
        let _ = self.events.send(SchedulingEvent::AppointmentCreated {
            appointment: appointment.clone(),
        });

        Ok(appointment)
    }
}
