use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{AssemblyId, ModalityId, RegistrationId};
use crate::domains::roster::EntityCategory;

/// Registration - a participant admitted (or awaiting admission) into an
/// assembly under one modality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub assembly_id: AssemblyId,
    pub modality_id: ModalityId,

    /// Opaque authenticated user identifier; the core never inspects it.
    pub user_id: String,

    pub participant: ParticipantSnapshot,
    pub status: RegistrationStatus,

    // Payment
    pub payment_exempted: bool,
    pub exemption_reason: Option<String>,
    /// Reference to an uploaded payment receipt held by external storage.
    pub receipt_reference: Option<String>,

    // Review audit trail (last review wins)
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Snapshot of the participant at registration time. Kept on the
/// registration so later roster imports cannot rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantSnapshot {
    /// Canonical entity linkage; `None` for ad-hoc ("other") participants.
    pub external_id: Option<String>,
    pub category: Option<EntityCategory>,

    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Option<String>,
    /// Committee registrants carry the committee display name as fallback
    /// identification for plenary attendance.
    pub committee_name: Option<String>,
}

impl ParticipantSnapshot {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Registration workflow status.
///
/// Transitions: pending -> approved | rejected; rejected -> pending
/// (resubmission); pending/pending_review/approved/rejected -> cancelled.
/// Nothing leaves approved or cancelled except deletion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Pending,
    PendingReview,
    Approved,
    Rejected,
    Cancelled,
}

impl RegistrationStatus {
    /// Whether the registration occupies a modality slot and blocks another
    /// registration of the same identity.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            RegistrationStatus::Pending
                | RegistrationStatus::PendingReview
                | RegistrationStatus::Approved
        )
    }

    /// Whether an organizer review (approve/reject) may be applied.
    pub fn is_reviewable(self) -> bool {
        matches!(
            self,
            RegistrationStatus::Pending | RegistrationStatus::PendingReview
        )
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationStatus::Pending => write!(f, "pending"),
            RegistrationStatus::PendingReview => write!(f, "pending_review"),
            RegistrationStatus::Approved => write!(f, "approved"),
            RegistrationStatus::Rejected => write!(f, "rejected"),
            RegistrationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for RegistrationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(RegistrationStatus::Pending),
            "pending_review" => Ok(RegistrationStatus::PendingReview),
            "approved" => Ok(RegistrationStatus::Approved),
            "rejected" => Ok(RegistrationStatus::Rejected),
            "cancelled" => Ok(RegistrationStatus::Cancelled),
            _ => Err(anyhow::anyhow!("invalid registration status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_statuses_occupy_a_slot() {
        assert!(RegistrationStatus::Pending.is_active());
        assert!(RegistrationStatus::PendingReview.is_active());
        assert!(RegistrationStatus::Approved.is_active());
        assert!(!RegistrationStatus::Rejected.is_active());
        assert!(!RegistrationStatus::Cancelled.is_active());
    }

    #[test]
    fn status_string_roundtrip() {
        for status in [
            RegistrationStatus::Pending,
            RegistrationStatus::PendingReview,
            RegistrationStatus::Approved,
            RegistrationStatus::Rejected,
            RegistrationStatus::Cancelled,
        ] {
            assert_eq!(
                status.to_string().parse::<RegistrationStatus>().unwrap(),
                status
            );
        }
        assert!("unknown".parse::<RegistrationStatus>().is_err());
    }
}
