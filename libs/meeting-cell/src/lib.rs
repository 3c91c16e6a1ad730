pub mod models;
pub mod services;

pub use models::{CreateMeetingRequest, Meeting, MeetingError, MeetingProvisioner};
pub use services::zoom::ZoomMeetingClient;
