//! Modality capacity accounting.
//!
//! A registration occupies a slot while its status is pending,
//! pending_review or approved; cancelled and rejected registrations free
//! their slot. The admission-time check (`check_reserve`) runs inside the
//! store's critical section so that check-then-insert is atomic with respect
//! to concurrent admissions on the same modality.

use crate::common::{DomainError, DomainResult, ModalityId};
use crate::kernel::CoreDeps;

/// A modality counts as nearly full at 90% of its maximum.
const NEAR_FULL_NUMERATOR: i64 = 9;
const NEAR_FULL_DENOMINATOR: i64 = 10;

/// Occupancy bucket for a modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityState {
    Open,
    NearFull,
    Full,
}

/// Number of slot-occupying registrations for the modality.
pub async fn current_count(modality_id: ModalityId, deps: &CoreDeps) -> DomainResult<i64> {
    deps.store
        .modality(modality_id)
        .await?
        .ok_or_else(|| DomainError::not_found("modality", modality_id))?;

    deps.store.count_active_registrations(modality_id).await
}

/// Occupancy bucket for the modality. Unbounded modalities are always open.
pub async fn capacity_state(modality_id: ModalityId, deps: &CoreDeps) -> DomainResult<CapacityState> {
    let modality = deps
        .store
        .modality(modality_id)
        .await?
        .ok_or_else(|| DomainError::not_found("modality", modality_id))?;

    let count = deps.store.count_active_registrations(modality_id).await?;
    Ok(capacity_state_for(count, modality.max_participants))
}

/// Pure occupancy arithmetic; `near full` means count >= 0.9 * max.
pub fn capacity_state_for(count: i64, max_participants: Option<i32>) -> CapacityState {
    let Some(max) = max_participants else {
        return CapacityState::Open;
    };
    let max = i64::from(max);

    if count >= max {
        CapacityState::Full
    } else if count * NEAR_FULL_DENOMINATOR >= max * NEAR_FULL_NUMERATOR {
        CapacityState::NearFull
    } else {
        CapacityState::Open
    }
}

/// Admission-time reservation check.
///
/// Must be called with `count` read inside the same critical section as the
/// subsequent insert. Fails when admitting one more participant would exceed
/// the maximum.
pub fn check_reserve(
    modality_id: ModalityId,
    count: i64,
    max_participants: Option<i32>,
) -> DomainResult<()> {
    if let Some(max) = max_participants {
        let max = i64::from(max);
        if count + 1 > max {
            return Err(DomainError::CapacityExceeded {
                modality_id,
                count,
                max,
            });
        }
    }
    Ok(())
}
