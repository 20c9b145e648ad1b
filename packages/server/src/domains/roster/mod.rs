//! Roster domain - builds the canonical list of registerable entities from
//! raw participant-import rows.

pub mod dedup;
pub mod models;

pub use dedup::build_roster;
pub use models::{CanonicalEntity, EntityCategory, RawParticipantRow, RosterScope, VotingStatus};
