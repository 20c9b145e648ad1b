//! sqlx/Postgres store.
//!
//! Row structs keep enum columns as text (the schema stores snake_case
//! strings) and convert at the boundary. The guarded registration insert
//! takes a `FOR UPDATE` lock on the modality row so capacity
//! check-then-insert is serialized per modality; the partial unique index in
//! the schema backstops identity uniqueness across modalities.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::common::{
    AssemblyId, AttendanceRecordId, DomainError, DomainResult, ModalityId, RegistrationId,
    SessionId,
};
use crate::domains::assembly::ledger;
use crate::domains::assembly::models::{Assembly, Modality};
use crate::domains::attendance::models::{AttendanceRecord, ParticipantType, Session};
use crate::domains::registration::models::{ParticipantSnapshot, Registration};
use crate::domains::roster::EntityCategory;

use super::{BaseStore, CascadeReport};

/// Postgres-backed implementation of [`BaseStore`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

const ACTIVE_STATUSES: &str = "('pending', 'pending_review', 'approved')";

// ============================================================================
// Row types (text-typed enum columns, converted at the boundary)
// ============================================================================

#[derive(sqlx::FromRow)]
struct AssemblyRow {
    id: AssemblyId,
    name: String,
    kind: String,
    status: String,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    registration_open: bool,
    registration_deadline: Option<DateTime<Utc>>,
    max_participants: Option<i32>,
    payment_required: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AssemblyRow> for Assembly {
    type Error = DomainError;

    fn try_from(row: AssemblyRow) -> DomainResult<Self> {
        Ok(Assembly {
            id: row.id,
            name: row.name,
            kind: row.kind.parse()?,
            status: row.status.parse()?,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            registration_open: row.registration_open,
            registration_deadline: row.registration_deadline,
            max_participants: row.max_participants,
            payment_required: row.payment_required,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ModalityRow {
    id: ModalityId,
    assembly_id: AssemblyId,
    name: String,
    price_cents: i32,
    max_participants: Option<i32>,
    active: bool,
    position: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ModalityRow> for Modality {
    fn from(row: ModalityRow) -> Self {
        Modality {
            id: row.id,
            assembly_id: row.assembly_id,
            name: row.name,
            price_cents: row.price_cents,
            max_participants: row.max_participants,
            active: row.active,
            position: row.position,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RegistrationRow {
    id: RegistrationId,
    assembly_id: AssemblyId,
    modality_id: ModalityId,
    user_id: String,
    external_id: Option<String>,
    category: Option<String>,
    first_name: String,
    last_name: String,
    email: String,
    role: Option<String>,
    committee_name: Option<String>,
    status: String,
    payment_exempted: bool,
    exemption_reason: Option<String>,
    receipt_reference: Option<String>,
    reviewed_by: Option<String>,
    reviewed_at: Option<DateTime<Utc>>,
    review_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = DomainError;

    fn try_from(row: RegistrationRow) -> DomainResult<Self> {
        Ok(Registration {
            id: row.id,
            assembly_id: row.assembly_id,
            modality_id: row.modality_id,
            user_id: row.user_id,
            participant: ParticipantSnapshot {
                external_id: row.external_id,
                category: row
                    .category
                    .as_deref()
                    .map(|c| c.parse::<EntityCategory>())
                    .transpose()?,
                first_name: row.first_name,
                last_name: row.last_name,
                email: row.email,
                role: row.role,
                committee_name: row.committee_name,
            },
            status: row.status.parse()?,
            payment_exempted: row.payment_exempted,
            exemption_reason: row.exemption_reason,
            receipt_reference: row.receipt_reference,
            reviewed_by: row.reviewed_by,
            reviewed_at: row.reviewed_at,
            review_notes: row.review_notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: SessionId,
    assembly_id: AssemblyId,
    name: String,
    session_type: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for Session {
    type Error = DomainError;

    fn try_from(row: SessionRow) -> DomainResult<Self> {
        Ok(Session {
            id: row.id,
            assembly_id: row.assembly_id,
            name: row.name,
            session_type: row.session_type.parse()?,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AttendanceRow {
    id: AttendanceRecordId,
    session_id: SessionId,
    participant_id: String,
    participant_type: String,
    display_name: String,
    role: Option<String>,
    state: String,
    marked_by: Option<String>,
    marked_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = DomainError;

    fn try_from(row: AttendanceRow) -> DomainResult<Self> {
        Ok(AttendanceRecord {
            id: row.id,
            session_id: row.session_id,
            participant_id: row.participant_id,
            participant_type: row.participant_type.parse()?,
            display_name: row.display_name,
            role: row.role,
            state: row.state.parse()?,
            marked_by: row.marked_by,
            marked_at: row.marked_at,
            created_at: row.created_at,
        })
    }
}

// ============================================================================
// Store implementation
// ============================================================================

#[async_trait]
impl BaseStore for PgStore {
    // ------------------------------------------------------------------
    // Assemblies
    // ------------------------------------------------------------------

    async fn insert_assembly(&self, assembly: Assembly) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO assemblies (
                id, name, kind, status, starts_at, ends_at,
                registration_open, registration_deadline, max_participants,
                payment_required, created_at, updated_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(assembly.id)
        .bind(&assembly.name)
        .bind(assembly.kind.to_string())
        .bind(assembly.status.to_string())
        .bind(assembly.starts_at)
        .bind(assembly.ends_at)
        .bind(assembly.registration_open)
        .bind(assembly.registration_deadline)
        .bind(assembly.max_participants)
        .bind(assembly.payment_required)
        .bind(assembly.created_at)
        .bind(assembly.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn assembly(&self, id: AssemblyId) -> DomainResult<Option<Assembly>> {
        sqlx::query_as::<_, AssemblyRow>("SELECT * FROM assemblies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Assembly::try_from)
            .transpose()
    }

    async fn update_assembly(&self, assembly: Assembly) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE assemblies SET
                name = $2, kind = $3, status = $4, starts_at = $5, ends_at = $6,
                registration_open = $7, registration_deadline = $8,
                max_participants = $9, payment_required = $10, updated_at = $11
             WHERE id = $1",
        )
        .bind(assembly.id)
        .bind(&assembly.name)
        .bind(assembly.kind.to_string())
        .bind(assembly.status.to_string())
        .bind(assembly.starts_at)
        .bind(assembly.ends_at)
        .bind(assembly.registration_open)
        .bind(assembly.registration_deadline)
        .bind(assembly.max_participants)
        .bind(assembly.payment_required)
        .bind(assembly.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("assembly", assembly.id));
        }
        Ok(())
    }

    async fn list_assemblies(&self) -> DomainResult<Vec<Assembly>> {
        sqlx::query_as::<_, AssemblyRow>("SELECT * FROM assemblies ORDER BY id")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Assembly::try_from)
            .collect()
    }

    async fn delete_assembly_cascade(&self, id: AssemblyId) -> DomainResult<CascadeReport> {
        let mut tx = self.pool.begin().await?;

        let attendance_records = sqlx::query(
            "DELETE FROM attendance_records
             WHERE session_id IN (SELECT id FROM sessions WHERE assembly_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let sessions = sqlx::query("DELETE FROM sessions WHERE assembly_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let registrations = sqlx::query("DELETE FROM registrations WHERE assembly_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let modalities = sqlx::query("DELETE FROM modalities WHERE assembly_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM assemblies WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(CascadeReport {
            modalities,
            registrations,
            sessions,
            attendance_records,
        })
    }

    // ------------------------------------------------------------------
    // Modalities
    // ------------------------------------------------------------------

    async fn insert_modality(&self, modality: Modality) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO modalities (
                id, assembly_id, name, price_cents, max_participants,
                active, position, created_at, updated_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(modality.id)
        .bind(modality.assembly_id)
        .bind(&modality.name)
        .bind(modality.price_cents)
        .bind(modality.max_participants)
        .bind(modality.active)
        .bind(modality.position)
        .bind(modality.created_at)
        .bind(modality.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn modality(&self, id: ModalityId) -> DomainResult<Option<Modality>> {
        Ok(
            sqlx::query_as::<_, ModalityRow>("SELECT * FROM modalities WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .map(Modality::from),
        )
    }

    async fn update_modality(&self, modality: Modality) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE modalities SET
                name = $2, price_cents = $3, max_participants = $4,
                active = $5, position = $6, updated_at = $7
             WHERE id = $1",
        )
        .bind(modality.id)
        .bind(&modality.name)
        .bind(modality.price_cents)
        .bind(modality.max_participants)
        .bind(modality.active)
        .bind(modality.position)
        .bind(modality.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("modality", modality.id));
        }
        Ok(())
    }

    async fn modalities_by_assembly(&self, assembly_id: AssemblyId) -> DomainResult<Vec<Modality>> {
        Ok(sqlx::query_as::<_, ModalityRow>(
            "SELECT * FROM modalities WHERE assembly_id = $1 ORDER BY position, id",
        )
        .bind(assembly_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Modality::from)
        .collect())
    }

    async fn count_active_registrations(&self, modality_id: ModalityId) -> DomainResult<i64> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM registrations
             WHERE modality_id = $1 AND status IN {ACTIVE_STATUSES}"
        ))
        .bind(modality_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    // ------------------------------------------------------------------
    // Registrations
    // ------------------------------------------------------------------

    async fn insert_registration_guarded(&self, registration: Registration) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        // Serialize concurrent admissions on this modality.
        let modality = sqlx::query_as::<_, ModalityRow>(
            "SELECT * FROM modalities WHERE id = $1 FOR UPDATE",
        )
        .bind(registration.modality_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DomainError::not_found("modality", registration.modality_id))?;

        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM registrations
             WHERE modality_id = $1 AND status IN {ACTIVE_STATUSES}"
        ))
        .bind(registration.modality_id)
        .fetch_one(&mut *tx)
        .await?;

        ledger::check_reserve(registration.modality_id, count, modality.max_participants)?;

        if registration.status.is_active() {
            if let Some(external_id) = registration.participant.external_id.as_deref() {
                let duplicate: bool = sqlx::query_scalar(&format!(
                    "SELECT EXISTS(
                        SELECT 1 FROM registrations
                        WHERE assembly_id = $1 AND external_id = $2
                          AND status IN {ACTIVE_STATUSES}
                     )"
                ))
                .bind(registration.assembly_id)
                .bind(external_id)
                .fetch_one(&mut *tx)
                .await?;

                if duplicate {
                    return Err(DomainError::DuplicateRegistration {
                        assembly_id: registration.assembly_id,
                        external_id: external_id.to_string(),
                    });
                }
            }
        }

        insert_registration_row(&registration, &mut tx)
            .await
            .map_err(|e| map_unique_violation(e, &registration))?;

        tx.commit().await?;
        Ok(())
    }

    async fn registration(&self, id: RegistrationId) -> DomainResult<Option<Registration>> {
        sqlx::query_as::<_, RegistrationRow>("SELECT * FROM registrations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Registration::try_from)
            .transpose()
    }

    async fn update_registration(&self, registration: Registration) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE registrations SET
                first_name = $2, last_name = $3, email = $4, role = $5,
                committee_name = $6, status = $7, payment_exempted = $8,
                exemption_reason = $9, receipt_reference = $10,
                reviewed_by = $11, reviewed_at = $12, review_notes = $13,
                updated_at = $14
             WHERE id = $1",
        )
        .bind(registration.id)
        .bind(&registration.participant.first_name)
        .bind(&registration.participant.last_name)
        .bind(&registration.participant.email)
        .bind(&registration.participant.role)
        .bind(&registration.participant.committee_name)
        .bind(registration.status.to_string())
        .bind(registration.payment_exempted)
        .bind(&registration.exemption_reason)
        .bind(&registration.receipt_reference)
        .bind(&registration.reviewed_by)
        .bind(registration.reviewed_at)
        .bind(&registration.review_notes)
        .bind(registration.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("registration", registration.id));
        }
        Ok(())
    }

    async fn delete_registration(&self, id: RegistrationId) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn registrations_by_assembly(
        &self,
        assembly_id: AssemblyId,
    ) -> DomainResult<Vec<Registration>> {
        sqlx::query_as::<_, RegistrationRow>(
            "SELECT * FROM registrations WHERE assembly_id = $1 ORDER BY id",
        )
        .bind(assembly_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Registration::try_from)
        .collect()
    }

    async fn registration_by_user(
        &self,
        assembly_id: AssemblyId,
        user_id: &str,
    ) -> DomainResult<Option<Registration>> {
        sqlx::query_as::<_, RegistrationRow>(&format!(
            "SELECT * FROM registrations
             WHERE assembly_id = $1 AND user_id = $2
             ORDER BY (status IN {ACTIVE_STATUSES}) DESC, created_at DESC
             LIMIT 1"
        ))
        .bind(assembly_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .map(Registration::try_from)
        .transpose()
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    async fn insert_session(&self, session: Session) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO sessions (
                id, assembly_id, name, session_type, status, created_at, updated_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(session.id)
        .bind(session.assembly_id)
        .bind(&session.name)
        .bind(session.session_type.to_string())
        .bind(session.status.to_string())
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn session(&self, id: SessionId) -> DomainResult<Option<Session>> {
        sqlx::query_as::<_, SessionRow>("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Session::try_from)
            .transpose()
    }

    async fn update_session(&self, session: Session) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE sessions SET
                name = $2, session_type = $3, status = $4, updated_at = $5
             WHERE id = $1",
        )
        .bind(session.id)
        .bind(&session.name)
        .bind(session.session_type.to_string())
        .bind(session.status.to_string())
        .bind(session.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("session", session.id));
        }
        Ok(())
    }

    async fn sessions_by_assembly(&self, assembly_id: AssemblyId) -> DomainResult<Vec<Session>> {
        sqlx::query_as::<_, SessionRow>(
            "SELECT * FROM sessions WHERE assembly_id = $1 ORDER BY id",
        )
        .bind(assembly_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Session::try_from)
        .collect()
    }

    async fn delete_session_cascade(&self, id: SessionId) -> DomainResult<u64> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM attendance_records WHERE session_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Attendance
    // ------------------------------------------------------------------

    async fn upsert_attendance(&self, record: AttendanceRecord) -> DomainResult<AttendanceRecord> {
        sqlx::query_as::<_, AttendanceRow>(
            "INSERT INTO attendance_records (
                id, session_id, participant_id, participant_type,
                display_name, role, state, marked_by, marked_at, created_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             ON CONFLICT (session_id, participant_id, participant_type)
             DO UPDATE SET
                display_name = EXCLUDED.display_name,
                role = EXCLUDED.role,
                state = EXCLUDED.state,
                marked_by = EXCLUDED.marked_by,
                marked_at = EXCLUDED.marked_at
             RETURNING *",
        )
        .bind(record.id)
        .bind(record.session_id)
        .bind(&record.participant_id)
        .bind(record.participant_type.to_string())
        .bind(&record.display_name)
        .bind(&record.role)
        .bind(record.state.to_string())
        .bind(&record.marked_by)
        .bind(record.marked_at)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await?
        .try_into()
    }

    async fn attendance_by_session(
        &self,
        session_id: SessionId,
    ) -> DomainResult<Vec<AttendanceRecord>> {
        sqlx::query_as::<_, AttendanceRow>(
            "SELECT * FROM attendance_records WHERE session_id = $1 ORDER BY id",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(AttendanceRecord::try_from)
        .collect()
    }

    async fn attendance_by_key(
        &self,
        session_id: SessionId,
        participant_id: &str,
        participant_type: ParticipantType,
    ) -> DomainResult<Option<AttendanceRecord>> {
        sqlx::query_as::<_, AttendanceRow>(
            "SELECT * FROM attendance_records
             WHERE session_id = $1 AND participant_id = $2 AND participant_type = $3",
        )
        .bind(session_id)
        .bind(participant_id)
        .bind(participant_type.to_string())
        .fetch_optional(&self.pool)
        .await?
        .map(AttendanceRecord::try_from)
        .transpose()
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn insert_registration_row(
    registration: &Registration,
    tx: &mut Transaction<'_, Postgres>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO registrations (
            id, assembly_id, modality_id, user_id, external_id, category,
            first_name, last_name, email, role, committee_name, status,
            payment_exempted, exemption_reason, receipt_reference,
            reviewed_by, reviewed_at, review_notes, created_at, updated_at
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                 $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)",
    )
    .bind(registration.id)
    .bind(registration.assembly_id)
    .bind(registration.modality_id)
    .bind(&registration.user_id)
    .bind(&registration.participant.external_id)
    .bind(registration.participant.category.map(|c| c.to_string()))
    .bind(&registration.participant.first_name)
    .bind(&registration.participant.last_name)
    .bind(&registration.participant.email)
    .bind(&registration.participant.role)
    .bind(&registration.participant.committee_name)
    .bind(registration.status.to_string())
    .bind(registration.payment_exempted)
    .bind(&registration.exemption_reason)
    .bind(&registration.receipt_reference)
    .bind(&registration.reviewed_by)
    .bind(registration.reviewed_at)
    .bind(&registration.review_notes)
    .bind(registration.created_at)
    .bind(registration.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// The partial unique index can still fire when two transactions insert the
/// same identity through different modalities; surface that as the domain
/// duplicate error instead of a bare database error.
fn map_unique_violation(error: sqlx::Error, registration: &Registration) -> DomainError {
    let is_unique = error
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false);

    if is_unique && registration.status.is_active() {
        if let Some(external_id) = registration.participant.external_id.clone() {
            return DomainError::DuplicateRegistration {
                assembly_id: registration.assembly_id,
                external_id,
            };
        }
    }
    DomainError::Database(error)
}
