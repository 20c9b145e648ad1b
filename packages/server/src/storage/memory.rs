//! In-memory store.
//!
//! One mutex over all tables: every operation is serialized, which makes the
//! guarded insert trivially atomic. Good enough for tests and embedded use;
//! production traffic goes through [`super::PgStore`].

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::common::{
    AssemblyId, DomainError, DomainResult, ModalityId, RegistrationId, SessionId,
};
use crate::domains::assembly::ledger;
use crate::domains::assembly::models::{Assembly, Modality};
use crate::domains::attendance::models::{AttendanceRecord, ParticipantType, Session};
use crate::domains::registration::models::Registration;

use super::{BaseStore, CascadeReport};

#[derive(Default)]
struct Tables {
    assemblies: HashMap<AssemblyId, Assembly>,
    modalities: HashMap<ModalityId, Modality>,
    registrations: HashMap<RegistrationId, Registration>,
    sessions: HashMap<SessionId, Session>,
    attendance: Vec<AttendanceRecord>,
}

/// Serialized in-memory implementation of [`BaseStore`].
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn active_count(tables: &Tables, modality_id: ModalityId) -> i64 {
        tables
            .registrations
            .values()
            .filter(|r| r.modality_id == modality_id && r.status.is_active())
            .count() as i64
    }
}

#[async_trait]
impl BaseStore for MemoryStore {
    // ------------------------------------------------------------------
    // Assemblies
    // ------------------------------------------------------------------

    async fn insert_assembly(&self, assembly: Assembly) -> DomainResult<()> {
        let mut tables = self.tables.lock().unwrap();
        tables.assemblies.insert(assembly.id, assembly);
        Ok(())
    }

    async fn assembly(&self, id: AssemblyId) -> DomainResult<Option<Assembly>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.assemblies.get(&id).cloned())
    }

    async fn update_assembly(&self, assembly: Assembly) -> DomainResult<()> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.assemblies.contains_key(&assembly.id) {
            return Err(DomainError::not_found("assembly", assembly.id));
        }
        tables.assemblies.insert(assembly.id, assembly);
        Ok(())
    }

    async fn list_assemblies(&self) -> DomainResult<Vec<Assembly>> {
        let tables = self.tables.lock().unwrap();
        let mut assemblies: Vec<Assembly> = tables.assemblies.values().cloned().collect();
        assemblies.sort_by_key(|a| a.id);
        Ok(assemblies)
    }

    async fn delete_assembly_cascade(&self, id: AssemblyId) -> DomainResult<CascadeReport> {
        let mut tables = self.tables.lock().unwrap();
        let mut report = CascadeReport::default();

        let before = tables.modalities.len();
        tables.modalities.retain(|_, m| m.assembly_id != id);
        report.modalities = (before - tables.modalities.len()) as u64;

        let before = tables.registrations.len();
        tables.registrations.retain(|_, r| r.assembly_id != id);
        report.registrations = (before - tables.registrations.len()) as u64;

        let session_ids: Vec<SessionId> = tables
            .sessions
            .values()
            .filter(|s| s.assembly_id == id)
            .map(|s| s.id)
            .collect();
        tables.sessions.retain(|_, s| s.assembly_id != id);
        report.sessions = session_ids.len() as u64;

        let before = tables.attendance.len();
        tables
            .attendance
            .retain(|r| !session_ids.contains(&r.session_id));
        report.attendance_records = (before - tables.attendance.len()) as u64;

        tables.assemblies.remove(&id);
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Modalities
    // ------------------------------------------------------------------

    async fn insert_modality(&self, modality: Modality) -> DomainResult<()> {
        let mut tables = self.tables.lock().unwrap();
        tables.modalities.insert(modality.id, modality);
        Ok(())
    }

    async fn modality(&self, id: ModalityId) -> DomainResult<Option<Modality>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.modalities.get(&id).cloned())
    }

    async fn update_modality(&self, modality: Modality) -> DomainResult<()> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.modalities.contains_key(&modality.id) {
            return Err(DomainError::not_found("modality", modality.id));
        }
        tables.modalities.insert(modality.id, modality);
        Ok(())
    }

    async fn modalities_by_assembly(&self, assembly_id: AssemblyId) -> DomainResult<Vec<Modality>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .modalities
            .values()
            .filter(|m| m.assembly_id == assembly_id)
            .cloned()
            .collect())
    }

    async fn count_active_registrations(&self, modality_id: ModalityId) -> DomainResult<i64> {
        let tables = self.tables.lock().unwrap();
        Ok(Self::active_count(&tables, modality_id))
    }

    // ------------------------------------------------------------------
    // Registrations
    // ------------------------------------------------------------------

    async fn insert_registration_guarded(&self, registration: Registration) -> DomainResult<()> {
        // The whole check-then-insert happens under the table lock; this is
        // the critical section the capacity invariant relies on.
        let mut tables = self.tables.lock().unwrap();

        let modality = tables
            .modalities
            .get(&registration.modality_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("modality", registration.modality_id))?;

        let count = Self::active_count(&tables, registration.modality_id);
        ledger::check_reserve(modality.id, count, modality.max_participants)?;

        if registration.status.is_active() {
            if let Some(external_id) = registration.participant.external_id.as_deref() {
                let duplicate = tables.registrations.values().any(|r| {
                    r.assembly_id == registration.assembly_id
                        && r.status.is_active()
                        && r.participant.external_id.as_deref() == Some(external_id)
                });
                if duplicate {
                    return Err(DomainError::DuplicateRegistration {
                        assembly_id: registration.assembly_id,
                        external_id: external_id.to_string(),
                    });
                }
            }
        }

        tables.registrations.insert(registration.id, registration);
        Ok(())
    }

    async fn registration(&self, id: RegistrationId) -> DomainResult<Option<Registration>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.registrations.get(&id).cloned())
    }

    async fn update_registration(&self, registration: Registration) -> DomainResult<()> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.registrations.contains_key(&registration.id) {
            return Err(DomainError::not_found("registration", registration.id));
        }
        tables.registrations.insert(registration.id, registration);
        Ok(())
    }

    async fn delete_registration(&self, id: RegistrationId) -> DomainResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.registrations.remove(&id).is_some())
    }

    async fn registrations_by_assembly(
        &self,
        assembly_id: AssemblyId,
    ) -> DomainResult<Vec<Registration>> {
        let tables = self.tables.lock().unwrap();
        let mut registrations: Vec<Registration> = tables
            .registrations
            .values()
            .filter(|r| r.assembly_id == assembly_id)
            .cloned()
            .collect();
        registrations.sort_by_key(|r| r.id);
        Ok(registrations)
    }

    async fn registration_by_user(
        &self,
        assembly_id: AssemblyId,
        user_id: &str,
    ) -> DomainResult<Option<Registration>> {
        let tables = self.tables.lock().unwrap();
        let mut candidates: Vec<&Registration> = tables
            .registrations
            .values()
            .filter(|r| r.assembly_id == assembly_id && r.user_id == user_id)
            .collect();
        candidates.sort_by(|a, b| {
            b.status
                .is_active()
                .cmp(&a.status.is_active())
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(candidates.first().map(|r| (*r).clone()))
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    async fn insert_session(&self, session: Session) -> DomainResult<()> {
        let mut tables = self.tables.lock().unwrap();
        tables.sessions.insert(session.id, session);
        Ok(())
    }

    async fn session(&self, id: SessionId) -> DomainResult<Option<Session>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.sessions.get(&id).cloned())
    }

    async fn update_session(&self, session: Session) -> DomainResult<()> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.sessions.contains_key(&session.id) {
            return Err(DomainError::not_found("session", session.id));
        }
        tables.sessions.insert(session.id, session);
        Ok(())
    }

    async fn sessions_by_assembly(&self, assembly_id: AssemblyId) -> DomainResult<Vec<Session>> {
        let tables = self.tables.lock().unwrap();
        let mut sessions: Vec<Session> = tables
            .sessions
            .values()
            .filter(|s| s.assembly_id == assembly_id)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.id);
        Ok(sessions)
    }

    async fn delete_session_cascade(&self, id: SessionId) -> DomainResult<u64> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.attendance.len();
        tables.attendance.retain(|r| r.session_id != id);
        let removed = (before - tables.attendance.len()) as u64;
        tables.sessions.remove(&id);
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Attendance
    // ------------------------------------------------------------------

    async fn upsert_attendance(&self, record: AttendanceRecord) -> DomainResult<AttendanceRecord> {
        let mut tables = self.tables.lock().unwrap();

        let existing = tables.attendance.iter_mut().find(|r| {
            r.session_id == record.session_id
                && r.participant_id == record.participant_id
                && r.participant_type == record.participant_type
        });

        let stored = match existing {
            Some(row) => {
                row.state = record.state;
                row.display_name = record.display_name;
                row.role = record.role;
                row.marked_by = record.marked_by;
                row.marked_at = Utc::now();
                row.clone()
            }
            None => {
                tables.attendance.push(record.clone());
                record
            }
        };
        Ok(stored)
    }

    async fn attendance_by_session(
        &self,
        session_id: SessionId,
    ) -> DomainResult<Vec<AttendanceRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .attendance
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn attendance_by_key(
        &self,
        session_id: SessionId,
        participant_id: &str,
        participant_type: ParticipantType,
    ) -> DomainResult<Option<AttendanceRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .attendance
            .iter()
            .find(|r| {
                r.session_id == session_id
                    && r.participant_id == participant_id
                    && r.participant_type == participant_type
            })
            .cloned())
    }
}
