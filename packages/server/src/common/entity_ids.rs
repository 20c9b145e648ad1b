//! Typed ID aliases for the domain entities.
//!
//! Marker types are never instantiated; they only parameterize [`Id`].

pub use super::id::Id;

/// Marker type for Assembly entities (governance meetings).
pub struct AssemblyEntity;

/// Marker type for Modality entities (registration categories).
pub struct ModalityEntity;

/// Marker type for Registration entities.
pub struct RegistrationEntity;

/// Marker type for Session entities (assembly sub-events).
pub struct SessionEntity;

/// Marker type for AttendanceRecord entities.
pub struct AttendanceRecordEntity;

/// Typed ID for assemblies.
pub type AssemblyId = Id<AssemblyEntity>;

/// Typed ID for modalities.
pub type ModalityId = Id<ModalityEntity>;

/// Typed ID for registrations.
pub type RegistrationId = Id<RegistrationEntity>;

/// Typed ID for sessions.
pub type SessionId = Id<SessionEntity>;

/// Typed ID for attendance records.
pub type AttendanceRecordId = Id<AttendanceRecordEntity>;
