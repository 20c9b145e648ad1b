//! Canonical roster construction.
//!
//! Raw import rows are grouped by (category, trimmed external id). The first
//! row of a group establishes the entity; later rows may only fill optional
//! fields that are still empty (first non-empty wins). The build never
//! fails: malformed rows are dropped, empty input yields an empty roster.

use std::collections::HashMap;

use crate::common::text::{fold_key, trim_or_none};
use crate::domains::roster::models::{
    CanonicalEntity, EntityCategory, RawParticipantRow, RosterScope,
};

/// Builds the deduplicated roster of registerable entities.
///
/// Output ordering: executive board, then regional coordinators (each sorted
/// by role, then external id), then local committees sorted by external id.
/// Comparison is case- and diacritic-insensitive.
pub fn build_roster(rows: &[RawParticipantRow], scope: RosterScope) -> Vec<CanonicalEntity> {
    let mut entities: Vec<CanonicalEntity> = Vec::new();
    let mut index: HashMap<(EntityCategory, String), usize> = HashMap::new();

    for row in rows {
        if !in_scope(row, scope) {
            continue;
        }
        let Some(external_id) = trim_or_none(Some(&row.external_id)) else {
            continue;
        };

        let key = (row.category, external_id.clone());
        match index.get(&key) {
            Some(&at) => merge_optional_fields(&mut entities[at], row),
            None => {
                index.insert(key, entities.len());
                entities.push(CanonicalEntity {
                    external_id,
                    category: row.category,
                    display_name: row.name.trim().to_string(),
                    role: trim_or_none(row.role.as_deref()),
                    location: trim_or_none(row.location.as_deref()),
                    voting_status: row.voting_status,
                });
            }
        }
    }

    entities.sort_by_key(sort_key);
    entities
}

fn in_scope(row: &RawParticipantRow, scope: RosterScope) -> bool {
    match (scope, row.assembly_scope) {
        (RosterScope::All, _) => true,
        (RosterScope::Assembly(_), None) => true,
        (RosterScope::Assembly(wanted), Some(scoped)) => wanted == scoped,
    }
}

/// First non-empty value wins; identity fields are never overwritten.
fn merge_optional_fields(entity: &mut CanonicalEntity, row: &RawParticipantRow) {
    if entity.display_name.is_empty() {
        entity.display_name = row.name.trim().to_string();
    }
    if entity.role.is_none() {
        entity.role = trim_or_none(row.role.as_deref());
    }
    if entity.location.is_none() {
        entity.location = trim_or_none(row.location.as_deref());
    }
    if entity.voting_status.is_none() {
        entity.voting_status = row.voting_status;
    }
}

fn sort_key(entity: &CanonicalEntity) -> (u8, String, String) {
    let within = match entity.category {
        EntityCategory::ExecutiveBoard | EntityCategory::RegionalCoordinator => {
            fold_key(entity.role.as_deref().unwrap_or(""))
        }
        EntityCategory::LocalCommittee => String::new(),
    };
    (entity.category.rank(), within, fold_key(&entity.external_id))
}
