use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{AssemblyId, SessionId};

/// Session - a sub-event of an assembly against which presence is tracked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub assembly_id: AssemblyId,
    pub name: String,
    pub session_type: SessionType,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

/// Session type. Plenary sessions track committees as entities; dedicated
/// sessions track individual delegates; ad-hoc roll calls are organizer-only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Plenary,
    Dedicated,
    AdHoc,
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionType::Plenary => write!(f, "plenary"),
            SessionType::Dedicated => write!(f, "dedicated"),
            SessionType::AdHoc => write!(f, "ad_hoc"),
        }
    }
}

impl std::str::FromStr for SessionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "plenary" => Ok(SessionType::Plenary),
            "dedicated" => Ok(SessionType::Dedicated),
            "ad_hoc" => Ok(SessionType::AdHoc),
            _ => Err(anyhow::anyhow!("invalid session type: {}", s)),
        }
    }
}

/// Session lifecycle status. Archived sessions freeze presence edits and can
/// be reopened.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Archived,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(SessionStatus::Active),
            "archived" => Ok(SessionStatus::Archived),
            _ => Err(anyhow::anyhow!("invalid session status: {}", s)),
        }
    }
}
