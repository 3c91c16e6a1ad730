// libs/scheduling-cell/src/services/mod.rs
pub mod availability;
pub mod booking;
pub mod conflict;
pub mod lifecycle;
pub mod slots;

pub use availability::AvailabilityService;
pub use booking::BookingCoordinator;
pub use conflict::ConflictDetector;
pub use lifecycle::AppointmentLifecycleService;
pub use slots::SlotGenerator;
