//! Kernel module - infrastructure ports and the dependency container.

pub mod deps;
pub mod test_dependencies;
pub mod traits;

pub use deps::CoreDeps;
pub use test_dependencies::{
    MockReceiptStore, RecordingNotifier, StaticIdentityService, TestDependencies,
};
pub use traits::*;
