//! Attendance domain - sessions, presence marking and quorum statistics.

pub mod actions;
pub mod models;
pub mod quorum;

pub use models::{AttendanceRecord, AttendanceState, ParticipantType, Session, SessionStatus, SessionType};
pub use quorum::{quorum_stats, QuorumStats};
