//! Call session state machine

use std::fmt;
use thiserror::Error;

/// Identity of one remote audio source in the call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Events emitted by the video-call provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEvent {
    Joined,
    ParticipantJoined(ParticipantId),
    ParticipantLeft(ParticipantId),
    Left,
    Error(String),
}

/// Call lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CallState {
    #[default]
    Idle,
    Joining,
    Joined,
    Recording,
    Left,
    Error,
}

impl CallState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Joining => "joining",
            Self::Joined => "joined",
            Self::Recording => "recording",
            Self::Left => "left",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: CallState,
    pub action: String,
}

/// Call session entity.
/// Manages state transitions for one call's capture lifecycle.
///
/// State machine:
///   IDLE -> JOINING (begin_join)
///   JOINING -> JOINED (confirm_join)
///   JOINED -> RECORDING (start_recording, once audio tracks exist)
///   RECORDING -> RECORDING (no-op on further participant joins)
///   * -> LEFT (leave)
///   * -> ERROR (fail)
#[derive(Debug, Default)]
pub struct CallSession {
    state: CallState,
}

impl CallSession {
    /// Create a new call session in idle state
    pub fn new() -> Self {
        Self {
            state: CallState::Idle,
        }
    }

    /// Get the current state
    pub fn state(&self) -> CallState {
        self.state
    }

    /// Check if join has been confirmed but recording has not started
    pub fn is_joined(&self) -> bool {
        self.state == CallState::Joined
    }

    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        self.state == CallState::Recording
    }

    /// Check if the session has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, CallState::Left | CallState::Error)
    }

    /// Transition from IDLE to JOINING
    pub fn begin_join(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != CallState::Idle {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "begin join".to_string(),
            });
        }
        self.state = CallState::Joining;
        Ok(())
    }

    /// Transition from JOINING to JOINED
    pub fn confirm_join(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != CallState::Joining {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "confirm join".to_string(),
            });
        }
        self.state = CallState::Joined;
        Ok(())
    }

    /// Transition from JOINED to RECORDING
    pub fn start_recording(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != CallState::Joined {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "start recording".to_string(),
            });
        }
        self.state = CallState::Recording;
        Ok(())
    }

    /// Transition to LEFT from any state
    pub fn leave(&mut self) {
        self.state = CallState::Left;
    }

    /// Transition to ERROR from any state
    pub fn fail(&mut self) {
        self.state = CallState::Error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_idle() {
        let session = CallSession::new();
        assert_eq!(session.state(), CallState::Idle);
        assert!(!session.is_joined());
        assert!(!session.is_recording());
    }

    #[test]
    fn begin_join_from_idle() {
        let mut session = CallSession::new();
        assert!(session.begin_join().is_ok());
        assert_eq!(session.state(), CallState::Joining);
    }

    #[test]
    fn begin_join_twice_fails() {
        let mut session = CallSession::new();
        session.begin_join().unwrap();

        let err = session.begin_join().unwrap_err();
        assert_eq!(err.current_state, CallState::Joining);
        assert!(err.action.contains("begin join"));
    }

    #[test]
    fn confirm_join_from_joining() {
        let mut session = CallSession::new();
        session.begin_join().unwrap();
        assert!(session.confirm_join().is_ok());
        assert!(session.is_joined());
    }

    #[test]
    fn confirm_join_from_idle_fails() {
        let mut session = CallSession::new();
        let err = session.confirm_join().unwrap_err();
        assert_eq!(err.current_state, CallState::Idle);
    }

    #[test]
    fn start_recording_from_joined() {
        let mut session = CallSession::new();
        session.begin_join().unwrap();
        session.confirm_join().unwrap();
        assert!(session.start_recording().is_ok());
        assert!(session.is_recording());
    }

    #[test]
    fn start_recording_twice_fails() {
        let mut session = CallSession::new();
        session.begin_join().unwrap();
        session.confirm_join().unwrap();
        session.start_recording().unwrap();

        let err = session.start_recording().unwrap_err();
        assert_eq!(err.current_state, CallState::Recording);
    }

    #[test]
    fn leave_from_any_state() {
        let mut session = CallSession::new();
        session.leave();
        assert_eq!(session.state(), CallState::Left);

        let mut session = CallSession::new();
        session.begin_join().unwrap();
        session.confirm_join().unwrap();
        session.start_recording().unwrap();
        session.leave();
        assert_eq!(session.state(), CallState::Left);
        assert!(session.is_terminal());
    }

    #[test]
    fn fail_from_any_state() {
        let mut session = CallSession::new();
        session.begin_join().unwrap();
        session.fail();
        assert_eq!(session.state(), CallState::Error);
        assert!(session.is_terminal());
    }

    #[test]
    fn no_recording_after_leave() {
        let mut session = CallSession::new();
        session.begin_join().unwrap();
        session.confirm_join().unwrap();
        session.leave();

        let err = session.start_recording().unwrap_err();
        assert_eq!(err.current_state, CallState::Left);
    }

    #[test]
    fn state_display() {
        assert_eq!(CallState::Idle.to_string(), "idle");
        assert_eq!(CallState::Recording.to_string(), "recording");
        assert_eq!(CallState::Error.to_string(), "error");
    }
}
