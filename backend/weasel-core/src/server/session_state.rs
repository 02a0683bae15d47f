//! Per-connection lifecycle tracking.

use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepted, not yet in the registry.
    Registering,
    /// Registered and reading frames.
    Active,
    /// Transport closed or failed; cleanup pending.
    Closing,
    /// Removed from the registry.
    Closed,
}

/// Enforces `Registering -> Active -> Closing -> Closed`.
///
/// `Registering -> Closing` is also allowed, for a session that could not be
/// registered and so never read a frame.
pub(crate) struct SessionLifecycle {
    state: SessionState,
}

impl SessionLifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: SessionState::Registering,
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn activate(&mut self) -> bool {
        self.transition(SessionState::Registering, SessionState::Active)
    }

    pub(crate) fn begin_close(&mut self) -> bool {
        match self.state {
            SessionState::Registering | SessionState::Active => {
                self.state = SessionState::Closing;
                true
            }
            other => {
                warn!("Ignoring close request in state {other:?}");
                false
            }
        }
    }

    pub(crate) fn finish(&mut self) -> bool {
        self.transition(SessionState::Closing, SessionState::Closed)
    }

    fn transition(&mut self, from: SessionState, to: SessionState) -> bool {
        if self.state != from {
            warn!(
                "Invalid session transition {:?} -> {:?} (expected from {:?})",
                self.state, to, from
            );
            return false;
        }
        self.state = to;
        true
    }
}
