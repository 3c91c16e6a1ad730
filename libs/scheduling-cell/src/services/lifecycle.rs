// libs/scheduling-cell/src/services/lifecycle.rs
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentStatus, CompleteAppointmentRequest, Prescription, SchedulingError,
    SchedulingEvent,
};
use crate::store::SchedulingStore;

/// Drives the appointment status machine. `cancelled` and `completed` are
/// terminal; every transition records who made it and when.
pub struct AppointmentLifecycleService {
    store: Arc<SchedulingStore>,
    events: broadcast::Sender<SchedulingEvent>,
}

impl AppointmentLifecycleService {
    pub fn new(store: Arc<SchedulingStore>, events: broadcast::Sender<SchedulingEvent>) -> Self {
        Self { store, events }
    }

    pub fn valid_transitions(&self, current: &AppointmentStatus) -> Vec<AppointmentStatus> {
        match current {
            AppointmentStatus::Confirmed => {
                vec![AppointmentStatus::Cancelled, AppointmentStatus::Completed]
            }
            AppointmentStatus::Cancelled | AppointmentStatus::Completed => Vec::new(),
        }
    }

    pub fn validate_transition(
        &self,
        current: &AppointmentStatus,
        next: &AppointmentStatus,
    ) -> Result<(), SchedulingError> {
        if self.valid_transitions(current).contains(next) {
            Ok(())
        } else {
            Err(SchedulingError::InvalidStatusTransition(current.clone()))
        }
    }

    /// Cancel a confirmed appointment, freeing its slot for rebooking.
    pub async fn cancel(
        &self,
        appointment_id: Uuid,
        actor_id: Uuid,
    ) -> Result<Appointment, SchedulingError> {
        let updated = self
            .store
            .update_appointment(appointment_id, |appointment| {
                self.validate_transition(&appointment.status, &AppointmentStatus::Cancelled)?;
                let now = Utc::now();
                appointment.status = AppointmentStatus::Cancelled;
                appointment.cancelled_at = Some(now);
                appointment.cancelled_by = Some(actor_id);
                appointment.updated_at = now;
                Ok(())
            })
            .await?;

        info!(%appointment_id, %actor_id, "appointment cancelled");
        let _ = self.events.send(SchedulingEvent::AppointmentCancelled {
            appointment: updated.clone(),
        });
        Ok(updated)
    }

    /// Complete a confirmed appointment, attaching session logs and an
    /// optional prescription.
    pub async fn complete(
        &self,
        appointment_id: Uuid,
        actor_id: Uuid,
        request: CompleteAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        let updated = self
            .store
            .update_appointment(appointment_id, |appointment| {
                self.validate_transition(&appointment.status, &AppointmentStatus::Completed)?;
                let now = Utc::now();
                appointment.status = AppointmentStatus::Completed;
                appointment.session_logs = request.logs.clone();
                appointment.prescription = request
                    .prescription_text
                    .clone()
                    .map(|text| Prescription { text });
                appointment.completed_at = Some(now);
                appointment.completed_by = Some(actor_id);
                appointment.updated_at = now;
                Ok(())
            })
            .await?;

        info!(%appointment_id, %actor_id, "appointment completed");
        let _ = self.events.send(SchedulingEvent::AppointmentCompleted {
            appointment: updated.clone(),
        });
        Ok(updated)
    }
}
