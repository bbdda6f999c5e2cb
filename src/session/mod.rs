//! Recruitment session management
//!
//! Owns the single in-flight session: lifecycle, roster, ownership, and the
//! auto-close timeout.

mod manager;

pub use manager::{
    CloseReason, JoinOutcome, Participant, SessionEvent, SessionId, SessionManager, SessionPhase,
    SessionSnapshot, ROSTER_CAPACITY,
};
