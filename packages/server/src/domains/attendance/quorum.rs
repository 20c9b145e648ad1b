//! Quorum arithmetic.
//!
//! Excluded participants leave the denominator entirely: they are ineligible
//! for this session, which is different from absent (eligible, not there).

use serde::Serialize;

use crate::domains::attendance::models::{AttendanceRecord, AttendanceState};

/// Live quorum statistics over a set of attendance rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct QuorumStats {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub excluded: usize,
    pub not_counting: usize,
    /// total - excluded.
    pub eligible: usize,
    /// present / eligible * 100; zero when nobody is eligible.
    pub quorum_percentage: f64,
}

/// Computes quorum over the given rows (typically one participant type of
/// one session).
pub fn quorum_stats(records: &[AttendanceRecord]) -> QuorumStats {
    let mut stats = QuorumStats {
        total: records.len(),
        ..Default::default()
    };

    for record in records {
        match record.state {
            AttendanceState::Present => stats.present += 1,
            AttendanceState::Absent => stats.absent += 1,
            AttendanceState::Excluded => stats.excluded += 1,
            AttendanceState::NotCounting => stats.not_counting += 1,
        }
    }

    stats.eligible = stats.total - stats.excluded;
    stats.quorum_percentage = if stats.eligible > 0 {
        stats.present as f64 / stats.eligible as f64 * 100.0
    } else {
        0.0
    };

    stats
}
