//! Domain modules. Each domain owns its models and entry-point actions;
//! cross-cutting infrastructure lives in `kernel` and `storage`.

pub mod analytics;
pub mod assembly;
pub mod attendance;
pub mod registration;
pub mod roster;
