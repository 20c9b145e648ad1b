//! Analytics domain - read-only reporting over roster and registrations.

pub mod coverage;

pub use coverage::{registration_coverage, CategoryCoverage, CoverageReport};
