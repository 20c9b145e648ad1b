use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::AssemblyId;

/// Assembly - a governance meeting instance participants register into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assembly {
    pub id: AssemblyId,
    pub name: String,
    pub kind: AssemblyKind,
    pub status: AssemblyStatus,

    /// Meeting time window.
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,

    // Registration window
    pub registration_open: bool,
    pub registration_deadline: Option<DateTime<Utc>>,

    /// Informational overall cap; admission is enforced per modality.
    pub max_participants: Option<i32>,

    /// Whether modality prices are charged by default for this assembly.
    pub payment_required: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assembly {
    /// Whether a registration can currently be created against this assembly.
    pub fn accepts_registrations(&self, now: DateTime<Utc>) -> bool {
        self.status == AssemblyStatus::Active
            && self.registration_open
            && self
                .registration_deadline
                .map(|deadline| now <= deadline)
                .unwrap_or(true)
    }
}

/// Assembly kind: statutory general assembly or extraordinary one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyKind {
    Ag,
    Age,
}

impl std::fmt::Display for AssemblyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssemblyKind::Ag => write!(f, "ag"),
            AssemblyKind::Age => write!(f, "age"),
        }
    }
}

impl std::str::FromStr for AssemblyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ag" => Ok(AssemblyKind::Ag),
            "age" => Ok(AssemblyKind::Age),
            _ => Err(anyhow::anyhow!("invalid assembly kind: {}", s)),
        }
    }
}

/// Assembly lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyStatus {
    Active,
    Archived,
}

impl std::fmt::Display for AssemblyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssemblyStatus::Active => write!(f, "active"),
            AssemblyStatus::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for AssemblyStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(AssemblyStatus::Active),
            "archived" => Ok(AssemblyStatus::Archived),
            _ => Err(anyhow::anyhow!("invalid assembly status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn assembly(open: bool, deadline: Option<DateTime<Utc>>) -> Assembly {
        let now = Utc::now();
        Assembly {
            id: AssemblyId::new(),
            name: "AG 2026".to_string(),
            kind: AssemblyKind::Ag,
            status: AssemblyStatus::Active,
            starts_at: now + Duration::days(30),
            ends_at: now + Duration::days(31),
            registration_open: open,
            registration_deadline: deadline,
            max_participants: None,
            payment_required: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn accepts_registrations_when_open_without_deadline() {
        assert!(assembly(true, None).accepts_registrations(Utc::now()));
        assert!(!assembly(false, None).accepts_registrations(Utc::now()));
    }

    #[test]
    fn deadline_in_the_past_closes_registration() {
        let past = Utc::now() - Duration::hours(1);
        assert!(!assembly(true, Some(past)).accepts_registrations(Utc::now()));

        let future = Utc::now() + Duration::hours(1);
        assert!(assembly(true, Some(future)).accepts_registrations(Utc::now()));
    }

    #[test]
    fn kind_string_roundtrip() {
        for kind in [AssemblyKind::Ag, AssemblyKind::Age] {
            assert_eq!(kind.to_string().parse::<AssemblyKind>().unwrap(), kind);
        }
    }
}
