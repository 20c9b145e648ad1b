//! Persistence port.
//!
//! The core talks to storage exclusively through [`BaseStore`]; the
//! surrounding system decides what backs it. Two implementations ship with
//! the crate: [`MemoryStore`] (serialized, for tests and embedding) and
//! [`PgStore`] (sqlx/Postgres).
//!
//! The one non-obvious contract is `insert_registration_guarded`: modality
//! capacity and identity uniqueness are checked inside the same critical
//! section as the insert, so two concurrent admissions racing for the last
//! slot can never both win.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::common::{AssemblyId, DomainResult, ModalityId, RegistrationId, SessionId};
use crate::domains::assembly::models::{Assembly, Modality};
use crate::domains::attendance::models::{AttendanceRecord, ParticipantType, Session};
use crate::domains::registration::models::Registration;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Row counts removed by an assembly cascade delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub modalities: u64,
    pub registrations: u64,
    pub sessions: u64,
    pub attendance_records: u64,
}

/// Typed record CRUD + indexed lookups + the two atomic primitives the
/// domain invariants need (guarded registration insert, attendance upsert).
#[async_trait]
pub trait BaseStore: Send + Sync {
    // ------------------------------------------------------------------
    // Assemblies
    // ------------------------------------------------------------------
    async fn insert_assembly(&self, assembly: Assembly) -> DomainResult<()>;
    async fn assembly(&self, id: AssemblyId) -> DomainResult<Option<Assembly>>;
    async fn update_assembly(&self, assembly: Assembly) -> DomainResult<()>;
    async fn list_assemblies(&self) -> DomainResult<Vec<Assembly>>;
    /// Deletes the assembly and every dependent modality, registration,
    /// session and attendance record.
    async fn delete_assembly_cascade(&self, id: AssemblyId) -> DomainResult<CascadeReport>;

    // ------------------------------------------------------------------
    // Modalities
    // ------------------------------------------------------------------
    async fn insert_modality(&self, modality: Modality) -> DomainResult<()>;
    async fn modality(&self, id: ModalityId) -> DomainResult<Option<Modality>>;
    async fn update_modality(&self, modality: Modality) -> DomainResult<()>;
    async fn modalities_by_assembly(&self, assembly_id: AssemblyId) -> DomainResult<Vec<Modality>>;
    /// Registrations holding a slot (pending/pending_review/approved).
    async fn count_active_registrations(&self, modality_id: ModalityId) -> DomainResult<i64>;

    // ------------------------------------------------------------------
    // Registrations
    // ------------------------------------------------------------------
    /// Atomic conditional insert: checks modality capacity and the
    /// one-active-registration-per-identity invariant, then inserts, all in
    /// one critical section. Fails with `CapacityExceeded` or
    /// `DuplicateRegistration`.
    async fn insert_registration_guarded(&self, registration: Registration) -> DomainResult<()>;
    async fn registration(&self, id: RegistrationId) -> DomainResult<Option<Registration>>;
    async fn update_registration(&self, registration: Registration) -> DomainResult<()>;
    /// Returns whether a row was actually removed.
    async fn delete_registration(&self, id: RegistrationId) -> DomainResult<bool>;
    async fn registrations_by_assembly(
        &self,
        assembly_id: AssemblyId,
    ) -> DomainResult<Vec<Registration>>;
    /// The caller's registration in an assembly: the active one when it
    /// exists, otherwise the most recently created.
    async fn registration_by_user(
        &self,
        assembly_id: AssemblyId,
        user_id: &str,
    ) -> DomainResult<Option<Registration>>;

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------
    async fn insert_session(&self, session: Session) -> DomainResult<()>;
    async fn session(&self, id: SessionId) -> DomainResult<Option<Session>>;
    async fn update_session(&self, session: Session) -> DomainResult<()>;
    async fn sessions_by_assembly(&self, assembly_id: AssemblyId) -> DomainResult<Vec<Session>>;
    /// Deletes the session and its attendance records; returns the number of
    /// records removed.
    async fn delete_session_cascade(&self, id: SessionId) -> DomainResult<u64>;

    // ------------------------------------------------------------------
    // Attendance
    // ------------------------------------------------------------------
    /// Last-write-wins upsert by (session, participant id, participant
    /// type). Returns the stored record.
    async fn upsert_attendance(&self, record: AttendanceRecord) -> DomainResult<AttendanceRecord>;
    async fn attendance_by_session(
        &self,
        session_id: SessionId,
    ) -> DomainResult<Vec<AttendanceRecord>>;
    async fn attendance_by_key(
        &self,
        session_id: SessionId,
        participant_id: &str,
        participant_type: ParticipantType,
    ) -> DomainResult<Option<AttendanceRecord>>;
}
