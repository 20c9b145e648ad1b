pub mod registration;

pub use registration::{ParticipantSnapshot, Registration, RegistrationStatus};
