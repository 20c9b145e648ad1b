//! Registration domain - admission, review, resubmission and deletion of
//! assembly registrations.

pub mod actions;
pub mod events;
pub mod models;

pub use events::RegistrationEvent;
pub use models::{ParticipantSnapshot, Registration, RegistrationStatus};
