// libs/meeting-cell/src/models.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to provision a video meeting for a confirmed appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMeetingRequest {
    /// Host identity in the upstream video service (email, user id, or "me").
    pub host_id: Option<String>,
    pub topic: String,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub timezone: String,
}

/// Provisioned meeting resource as stored on the appointment record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub join_url: String,
    pub start_url: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum MeetingError {
    #[error("Meeting provisioning is not configured")]
    NotConfigured,

    #[error("Token fetch failed: {0}")]
    TokenError(String),

    #[error("Meeting API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response from meeting service: {0}")]
    InvalidResponse(String),

    #[error("Request to meeting service failed: {0}")]
    RequestFailed(String),
}

impl From<reqwest::Error> for MeetingError {
    fn from(err: reqwest::Error) -> Self {
        MeetingError::RequestFailed(err.to_string())
    }
}

/// Boundary consumed by the booking coordinator. Implemented by the Zoom
/// client in production and by stubs in tests.
#[async_trait]
pub trait MeetingProvisioner: Send + Sync {
    async fn create_meeting(&self, request: CreateMeetingRequest) -> Result<Meeting, MeetingError>;
}
