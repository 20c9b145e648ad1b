pub mod marking;
pub mod self_attendance;
pub mod sessions;

pub use marking::{advance_attendance, list_attendance, mark_attendance, ParticipantRef};
pub use self_attendance::{
    mark_self_attendance, resolve_self_attendance_target, SelfAttendanceTarget,
};
pub use sessions::{
    archive_session, create_session, delete_session, get_session, list_sessions, reopen_session,
    NewSession,
};
