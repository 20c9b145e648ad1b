use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{AssemblyId, ModalityId};

/// Modality - a priced, capacity-bounded registration category of an
/// assembly ("on-site delegate", "remote observer", ...).
///
/// The current registration count is always computed from registrations,
/// never stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Modality {
    pub id: ModalityId,
    pub assembly_id: AssemblyId,
    pub name: String,

    /// Price in minor currency units; 0 means free.
    pub price_cents: i32,

    /// Maximum admitted participants; `None` means unbounded.
    pub max_participants: Option<i32>,

    pub active: bool,

    /// Display ordering among the assembly's modalities.
    pub position: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Modality {
    pub fn is_free(&self) -> bool {
        self.price_cents == 0
    }
}
