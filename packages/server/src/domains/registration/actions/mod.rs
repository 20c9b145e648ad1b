pub mod create;
pub mod delete;
pub mod lifecycle;
pub mod queries;
pub mod resubmit;
pub mod review;

pub use create::{
    create_registration, CreateRegistration, CreatedRegistration, RegistrationForm,
    RegistrationPolicy,
};
pub use delete::{bulk_delete, delete_registration, ArtifactFailure, DeleteReport};
pub use lifecycle::{attach_receipt, cancel_registration};
pub use queries::{
    get_registration, list_registrations, pending_registrations, registration_for_user,
};
pub use resubmit::resubmit_registration;
pub use review::{bulk_review, review_registration, BulkOutcome, ReviewDecision};
