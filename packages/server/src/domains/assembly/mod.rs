//! Assembly domain - assemblies, their registration modalities, and the
//! modality capacity ledger.

pub mod actions;
pub mod ledger;
pub mod models;

pub use ledger::CapacityState;
pub use models::{Assembly, AssemblyKind, AssemblyStatus, Modality};
