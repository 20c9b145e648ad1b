use serde::{Deserialize, Serialize};

use crate::common::AssemblyId;

/// Category of a registerable entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    ExecutiveBoard,
    RegionalCoordinator,
    LocalCommittee,
}

impl EntityCategory {
    /// Stable display ordering of roster sections.
    pub(crate) fn rank(self) -> u8 {
        match self {
            EntityCategory::ExecutiveBoard => 0,
            EntityCategory::RegionalCoordinator => 1,
            EntityCategory::LocalCommittee => 2,
        }
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityCategory::ExecutiveBoard => write!(f, "executive_board"),
            EntityCategory::RegionalCoordinator => write!(f, "regional_coordinator"),
            EntityCategory::LocalCommittee => write!(f, "local_committee"),
        }
    }
}

impl std::str::FromStr for EntityCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "executive_board" => Ok(EntityCategory::ExecutiveBoard),
            "regional_coordinator" => Ok(EntityCategory::RegionalCoordinator),
            "local_committee" => Ok(EntityCategory::LocalCommittee),
            _ => Err(anyhow::anyhow!("invalid entity category: {}", s)),
        }
    }
}

/// Voting eligibility of a local committee, affecting quorum weighting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VotingStatus {
    FullVoting,
    LimitedVoting,
}

impl std::fmt::Display for VotingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingStatus::FullVoting => write!(f, "full_voting"),
            VotingStatus::LimitedVoting => write!(f, "limited_voting"),
        }
    }
}

impl std::str::FromStr for VotingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "full_voting" => Ok(VotingStatus::FullVoting),
            "limited_voting" => Ok(VotingStatus::LimitedVoting),
            _ => Err(anyhow::anyhow!("invalid voting status: {}", s)),
        }
    }
}

/// One raw participant-import row, as handed over by the import pipeline.
///
/// Rows are noisy: duplicated identifiers, stray whitespace, partially
/// filled optional columns. The deduplicator cleans this up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawParticipantRow {
    pub category: EntityCategory,
    pub external_id: String,
    pub name: String,
    pub role: Option<String>,
    pub location: Option<String>,
    /// Local committees only.
    pub voting_status: Option<VotingStatus>,
    /// Some committee rows are scoped to a single assembly.
    pub assembly_scope: Option<AssemblyId>,
}

/// A deduplicated registerable identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalEntity {
    pub external_id: String,
    pub category: EntityCategory,
    pub display_name: String,
    pub role: Option<String>,
    pub location: Option<String>,
    /// Local committees only.
    pub voting_status: Option<VotingStatus>,
}

/// Which rows a roster build considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterScope {
    /// Every row, regardless of assembly scoping.
    All,
    /// Unscoped rows plus rows scoped to the given assembly.
    Assembly(AssemblyId),
}
