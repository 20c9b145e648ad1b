pub mod assembly;
pub mod modality;

pub use assembly::{Assembly, AssemblyKind, AssemblyStatus};
pub use modality::Modality;
