pub mod attendance_record;
pub mod session;

pub use attendance_record::{AttendanceRecord, AttendanceState, ParticipantType};
pub use session::{Session, SessionStatus, SessionType};
