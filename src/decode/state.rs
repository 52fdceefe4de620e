//! Decoder session lifecycle.

/// Session states, in lifecycle order. Transitions are validated so a
/// misused session fails loudly instead of corrupting the slot pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, no codec bound yet.
    Unconfigured,
    /// Codec bound, slot pools not allocated.
    Configured,
    /// Accepting input and producing output.
    Running,
    /// End-of-stream submitted; flushing buffered frames.
    Draining,
    /// Torn down. Terminal.
    Stopped,
}

impl SessionState {
    /// Whether moving to `next` is legal. Stopping is legal from every
    /// state, including Stopped itself, so teardown can be idempotent.
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;

        match (self, next) {
            (_, Stopped) => true,
            (Unconfigured, Configured) => true,
            (Configured, Running) => true,
            (Running, Draining) => true,
            _ => false,
        }
    }

    /// Running or Draining: the only states in which slots move.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Running | SessionState::Draining)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Unconfigured => "Unconfigured",
            SessionState::Configured => "Configured",
            SessionState::Running => "Running",
            SessionState::Draining => "Draining",
            SessionState::Stopped => "Stopped",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
