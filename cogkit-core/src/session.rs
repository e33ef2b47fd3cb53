/// Lifecycle of one task session.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Active,
    Completed,
}

impl SessionState {
    pub fn allows_input(&self) -> bool {
        !matches!(self, Self::Completed)
    }

    pub fn next(&self) -> Option<Self> {
        use SessionState::*;
        Some(match self {
            Idle => Active,
            Active => Completed,
            Completed => return None,
        })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, SessionState::Completed)
    }
}

/// Session bookkeeping in timer nanoseconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    state: SessionState,
    started_at: Option<u64>,
    ended_at: Option<u64>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn started_at(&self) -> Option<u64> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<u64> {
        self.ended_at
    }

    /// Idle -> Active. Returns false if the session was already started.
    pub fn start(&mut self, now_ns: u64) -> bool {
        if !self.state.is_idle() {
            return false;
        }
        self.state = SessionState::Active;
        self.started_at = Some(now_ns);
        true
    }

    /// Active -> Completed. Returns true only on the transition itself, so
    /// callers can gate the completion hook on it.
    pub fn complete(&mut self, now_ns: u64) -> bool {
        if !self.state.is_active() {
            return false;
        }
        self.state = SessionState::Completed;
        self.ended_at = Some(now_ns);
        true
    }

    /// Elapsed time: frozen once completed, zero while idle.
    pub fn elapsed_ns(&self, now_ns: u64) -> u64 {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => end.saturating_sub(start),
            (Some(start), None) => now_ns.saturating_sub(start),
            _ => 0,
        }
    }

    pub fn elapsed_ms(&self, now_ns: u64) -> u64 {
        self.elapsed_ns(now_ns) / 1_000_000
    }
}
