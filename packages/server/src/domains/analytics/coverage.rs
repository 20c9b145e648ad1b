//! Registration coverage: how much of the canonical roster has registered.

use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

use crate::common::{AssemblyId, DomainResult};
use crate::domains::registration::models::Registration;
use crate::domains::roster::{build_roster, EntityCategory, RawParticipantRow, RosterScope};
use crate::kernel::CoreDeps;

/// Coverage of one roster category.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryCoverage {
    pub category: EntityCategory,
    pub total: usize,
    pub registered: usize,
    pub unregistered: usize,
    /// registered / total * 100; zero for an empty category.
    pub registration_rate: f64,
}

/// Per-assembly coverage report.
///
/// `expected_total == actual_total` must hold; a mismatch means an identity
/// holds more than one active registration (a desync bug) and is surfaced as
/// a warning, never silently swallowed.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    pub assembly_id: AssemblyId,
    pub categories: Vec<CategoryCoverage>,
    /// Active registrations with no canonical entity behind them, including
    /// orphans whose entity disappeared from the roster.
    pub other_count: usize,
    pub expected_total: usize,
    pub actual_total: usize,
    pub integrity_warning: Option<String>,
}

/// Join the deduplicated roster against the assembly's active registrations.
///
/// Active means non-cancelled, non-rejected. Registrations referencing an
/// unknown canonical entity are counted as "other" rather than dropped.
pub async fn registration_coverage(
    assembly_id: AssemblyId,
    rows: &[RawParticipantRow],
    deps: &CoreDeps,
) -> DomainResult<CoverageReport> {
    let roster = build_roster(rows, RosterScope::Assembly(assembly_id));

    let active: Vec<Registration> = deps
        .store
        .registrations_by_assembly(assembly_id)
        .await?
        .into_iter()
        .filter(|r| r.status.is_active())
        .collect();

    let roster_keys: HashSet<(EntityCategory, &str)> = roster
        .iter()
        .map(|e| (e.category, e.external_id.as_str()))
        .collect();

    // Distinct registered entities per category; anything unmatched is
    // "other".
    let mut registered: HashSet<(EntityCategory, &str)> = HashSet::new();
    let mut other_count = 0usize;
    for registration in &active {
        let key = match (
            registration.participant.category,
            registration.participant.external_id.as_deref(),
        ) {
            (Some(category), Some(external_id)) if roster_keys.contains(&(category, external_id)) => {
                (category, external_id)
            }
            _ => {
                other_count += 1;
                continue;
            }
        };
        registered.insert(key);
    }

    let categories: Vec<CategoryCoverage> = [
        EntityCategory::ExecutiveBoard,
        EntityCategory::RegionalCoordinator,
        EntityCategory::LocalCommittee,
    ]
    .into_iter()
    .map(|category| {
        let total = roster.iter().filter(|e| e.category == category).count();
        let matched = registered.iter().filter(|(c, _)| *c == category).count();
        CategoryCoverage {
            category,
            total,
            registered: matched,
            unregistered: total.saturating_sub(matched),
            registration_rate: if total > 0 {
                matched as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        }
    })
    .collect();

    let predefined_matched: usize = categories.iter().map(|c| c.registered).sum();
    let expected_total = predefined_matched + other_count;
    let actual_total = active.len();

    let integrity_warning = if expected_total != actual_total {
        let message = format!(
            "coverage mismatch for assembly {}: expected {} registrations ({} matched + {} other) but found {}",
            assembly_id, expected_total, predefined_matched, other_count, actual_total
        );
        warn!(
            assembly_id = %assembly_id,
            expected_total = expected_total,
            actual_total = actual_total,
            "registration coverage desync detected"
        );
        Some(message)
    } else {
        None
    };

    Ok(CoverageReport {
        assembly_id,
        categories,
        other_count,
        expected_total,
        actual_total,
        integrity_warning,
    })
}
