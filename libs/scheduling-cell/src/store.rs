// libs/scheduling-cell/src/store.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::models::{Appointment, SchedulingError, TherapistProfile};

/// In-process store for therapist profiles and appointments.
///
/// Consistency contract: the plain read/write methods only guarantee
/// individual-operation atomicity. Any check-then-insert sequence (the
/// booking path) must run under the per-therapist lock from
/// [`SchedulingStore::booking_lock`], which serializes bookings for one
/// therapist while leaving other therapists fully concurrent.
#[derive(Default)]
pub struct SchedulingStore {
    profiles: RwLock<HashMap<Uuid, TherapistProfile>>,
    appointments: RwLock<HashMap<Uuid, Appointment>>,
    booking_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl SchedulingStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // THERAPIST PROFILES
    // ==========================================================================

    pub async fn upsert_profile(&self, profile: TherapistProfile) -> TherapistProfile {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.therapist_id, profile.clone());
        profile
    }

    pub async fn get_profile(&self, therapist_id: Uuid) -> Option<TherapistProfile> {
        let profiles = self.profiles.read().await;
        profiles.get(&therapist_id).cloned()
    }

    pub async fn list_accepting_profiles(&self) -> Vec<TherapistProfile> {
        let profiles = self.profiles.read().await;
        let mut accepting: Vec<TherapistProfile> =
            profiles.values().filter(|p| p.is_accepting).cloned().collect();
        accepting.sort_by_key(|p| p.therapist_id);
        accepting
    }

    // ==========================================================================
    // BOOKING LOCKS
    // ==========================================================================

    /// Lazily created, never reclaimed; one lock per therapist that has ever
    /// been booked against.
    pub async fn booking_lock(&self, therapist_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.booking_locks.lock().await;
        locks
            .entry(therapist_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // ==========================================================================
    // APPOINTMENTS
    // ==========================================================================

    pub async fn insert_appointment(&self, appointment: Appointment) {
        let mut appointments = self.appointments.write().await;
        appointments.insert(appointment.id, appointment);
    }

    pub async fn get_appointment(&self, id: Uuid) -> Option<Appointment> {
        let appointments = self.appointments.read().await;
        appointments.get(&id).cloned()
    }

    /// Apply a mutation to one appointment under the write lock. The closure
    /// failing leaves the stored appointment untouched.
    pub async fn update_appointment<F>(
        &self,
        id: Uuid,
        apply: F,
    ) -> Result<Appointment, SchedulingError>
    where
        F: FnOnce(&mut Appointment) -> Result<(), SchedulingError>,
    {
        let mut appointments = self.appointments.write().await;
        let appointment = appointments.get_mut(&id).ok_or(SchedulingError::NotFound)?;

        let mut candidate = appointment.clone();
        apply(&mut candidate)?;
        *appointment = candidate.clone();

        Ok(candidate)
    }

    /// All appointments (any status) for one therapist on one UTC calendar
    /// day, ordered by start time.
    pub async fn appointments_for_day(
        &self,
        therapist_id: Uuid,
        date: NaiveDate,
    ) -> Vec<Appointment> {
        let appointments = self.appointments.read().await;
        let mut day: Vec<Appointment> = appointments
            .values()
            .filter(|a| a.therapist_id == therapist_id && a.start_time.date_naive() == date)
            .cloned()
            .collect();
        day.sort_by_key(|a| a.start_time);
        day
    }

    pub async fn appointments_for_therapist(&self, therapist_id: Uuid) -> Vec<Appointment> {
        let appointments = self.appointments.read().await;
        let mut list: Vec<Appointment> = appointments
            .values()
            .filter(|a| a.therapist_id == therapist_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        list
    }

    pub async fn appointments_for_patient(&self, patient_id: Uuid) -> Vec<Appointment> {
        let appointments = self.appointments.read().await;
        let mut list: Vec<Appointment> = appointments
            .values()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        list
    }
}
