// libs/scheduling-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::models::{
    SchedulingError, TherapistDirectoryEntry, TherapistProfile, UpsertTherapistProfileRequest,
};
use crate::store::SchedulingStore;

/// Owns therapist profiles: the published weekly availability, the accepting
/// flag, and the public directory view.
pub struct AvailabilityService {
    store: Arc<SchedulingStore>,
}

impl AvailabilityService {
    pub fn new(store: Arc<SchedulingStore>) -> Self {
        Self { store }
    }

    /// Create or fully replace a therapist's profile. Availability windows
    /// are validated before anything is written, so a rejected request leaves
    /// the previous profile in place.
    pub async fn upsert_profile(
        &self,
        therapist_id: Uuid,
        request: UpsertTherapistProfileRequest,
    ) -> Result<TherapistProfile, SchedulingError> {
        let availability = request.availability.unwrap_or_default();
        availability.validate()?;

        let now = Utc::now();
        let existing = self.store.get_profile(therapist_id).await;
        let created_at = existing.as_ref().map(|p| p.created_at).unwrap_or(now);

        let profile = TherapistProfile {
            therapist_id,
            meeting_host_id: request
                .meeting_host_id
                .or_else(|| existing.as_ref().and_then(|p| p.meeting_host_id.clone())),
            timezone: request.timezone.unwrap_or_else(|| "UTC".to_string()),
            specialties: request.specialties.unwrap_or_default(),
            bio: request.bio.unwrap_or_default(),
            availability,
            is_accepting: request.is_accepting.unwrap_or(true),
            created_at,
            updated_at: now,
        };

        let saved = self.store.upsert_profile(profile).await;
        info!(%therapist_id, is_accepting = saved.is_accepting, "therapist profile upserted");
        Ok(saved)
    }

    pub async fn get_profile(
        &self,
        therapist_id: Uuid,
    ) -> Result<TherapistProfile, SchedulingError> {
        self.store
            .get_profile(therapist_id)
            .await
            .ok_or(SchedulingError::ProfileNotFound)
    }

    /// Public directory of therapists currently accepting bookings.
    pub async fn list_therapists(&self) -> Vec<TherapistDirectoryEntry> {
        self.store
            .list_accepting_profiles()
            .await
            .iter()
            .map(TherapistDirectoryEntry::from)
            .collect()
    }
}
