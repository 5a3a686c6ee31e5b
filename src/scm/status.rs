//! Native service status as reported by the service database.

use std::time::Duration;

/// Native service state codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeState {
    Stopped,
    StartPending,
    StopPending,
    Running,
    ContinuePending,
    PausePending,
    Paused,
    /// A code outside the documented set.
    Unknown(u32),
}

impl NativeState {
    /// Decode a raw `dwCurrentState` value.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => NativeState::Stopped,
            2 => NativeState::StartPending,
            3 => NativeState::StopPending,
            4 => NativeState::Running,
            5 => NativeState::ContinuePending,
            6 => NativeState::PausePending,
            7 => NativeState::Paused,
            other => NativeState::Unknown(other),
        }
    }

    /// The raw `dwCurrentState` value.
    pub fn code(self) -> u32 {
        match self {
            NativeState::Stopped => 1,
            NativeState::StartPending => 2,
            NativeState::StopPending => 3,
            NativeState::Running => 4,
            NativeState::ContinuePending => 5,
            NativeState::PausePending => 6,
            NativeState::Paused => 7,
            NativeState::Unknown(code) => code,
        }
    }
}

/// Snapshot of a service's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceStatus {
    pub state: NativeState,
    /// Time the service expects its pending transition to take.
    /// Untrusted: some services report minutes.
    pub wait_hint: Duration,
}

impl ServiceStatus {
    pub fn new(state: NativeState) -> Self {
        Self {
            state,
            wait_hint: Duration::ZERO,
        }
    }

    pub fn with_wait_hint(mut self, wait_hint: Duration) -> Self {
        self.wait_hint = wait_hint;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_decode_and_encode() {
        for code in 1..=7 {
            let state = NativeState::from_code(code);
            assert!(!matches!(state, NativeState::Unknown(_)));
            assert_eq!(state.code(), code);
        }
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        assert_eq!(NativeState::from_code(0), NativeState::Unknown(0));
        assert_eq!(NativeState::from_code(42).code(), 42);
    }
}
