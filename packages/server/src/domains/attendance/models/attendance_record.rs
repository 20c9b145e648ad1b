use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{AttendanceRecordId, SessionId};
use crate::domains::roster::EntityCategory;

/// AttendanceRecord - presence state of one participant in one session.
///
/// Keyed by (session, participant id, participant type); the store upserts
/// on that key so there is never more than one record per participant and
/// session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: AttendanceRecordId,
    pub session_id: SessionId,

    /// External id for roster entities, opaque user id for delegates,
    /// committee name when a committee has no external id.
    pub participant_id: String,
    pub participant_type: ParticipantType,

    pub display_name: String,
    pub role: Option<String>,

    pub state: AttendanceState,

    /// Who marked it: an organizer id, or the participant's own id for
    /// self-attendance.
    pub marked_by: Option<String>,
    pub marked_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
}

/// Kind of participant an attendance row refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantType {
    ExecutiveBoard,
    RegionalCoordinator,
    LocalCommittee,
    IndividualDelegate,
}

impl From<EntityCategory> for ParticipantType {
    fn from(category: EntityCategory) -> Self {
        match category {
            EntityCategory::ExecutiveBoard => ParticipantType::ExecutiveBoard,
            EntityCategory::RegionalCoordinator => ParticipantType::RegionalCoordinator,
            EntityCategory::LocalCommittee => ParticipantType::LocalCommittee,
        }
    }
}

impl std::fmt::Display for ParticipantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParticipantType::ExecutiveBoard => write!(f, "executive_board"),
            ParticipantType::RegionalCoordinator => write!(f, "regional_coordinator"),
            ParticipantType::LocalCommittee => write!(f, "local_committee"),
            ParticipantType::IndividualDelegate => write!(f, "individual_delegate"),
        }
    }
}

impl std::str::FromStr for ParticipantType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "executive_board" => Ok(ParticipantType::ExecutiveBoard),
            "regional_coordinator" => Ok(ParticipantType::RegionalCoordinator),
            "local_committee" => Ok(ParticipantType::LocalCommittee),
            "individual_delegate" => Ok(ParticipantType::IndividualDelegate),
            _ => Err(anyhow::anyhow!("invalid participant type: {}", s)),
        }
    }
}

/// Presence state of a participant in a session.
///
/// `Excluded` removes the participant from the quorum denominator entirely;
/// `Absent` keeps them eligible but not present.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceState {
    NotCounting,
    Present,
    Absent,
    Excluded,
}

impl AttendanceState {
    /// The fixed organizer tap-through cycle.
    pub fn next(self) -> AttendanceState {
        match self {
            AttendanceState::NotCounting => AttendanceState::Present,
            AttendanceState::Present => AttendanceState::Absent,
            AttendanceState::Absent => AttendanceState::Excluded,
            AttendanceState::Excluded => AttendanceState::NotCounting,
        }
    }
}

impl std::fmt::Display for AttendanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceState::NotCounting => write!(f, "not_counting"),
            AttendanceState::Present => write!(f, "present"),
            AttendanceState::Absent => write!(f, "absent"),
            AttendanceState::Excluded => write!(f, "excluded"),
        }
    }
}

impl std::str::FromStr for AttendanceState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "not_counting" => Ok(AttendanceState::NotCounting),
            "present" => Ok(AttendanceState::Present),
            "absent" => Ok(AttendanceState::Absent),
            "excluded" => Ok(AttendanceState::Excluded),
            _ => Err(anyhow::anyhow!("invalid attendance state: {}", s)),
        }
    }
}
