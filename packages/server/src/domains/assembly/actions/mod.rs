pub mod assemblies;
pub mod modalities;

pub use assemblies::{
    archive_assembly, create_assembly, delete_assembly, get_assembly, set_registration_open,
    NewAssembly,
};
pub use modalities::{create_modality, list_modalities, set_modality_active, NewModality};
