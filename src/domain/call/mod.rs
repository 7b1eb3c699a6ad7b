//! Call lifecycle domain module

mod session;

pub use session::{CallEvent, CallSession, CallState, InvalidStateTransition, ParticipantId};
