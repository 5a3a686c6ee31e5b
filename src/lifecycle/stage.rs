//! User-facing service stages.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scm::NativeState;

/// Observable lifecycle stage of the tunnel service.
///
/// Computed fresh from the native status on every query; never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStage {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
    Reconnecting,
    /// Permission or configuration failure.
    Denied,
    /// Unrecognized native state.
    NoConnection,
}

impl ServiceStage {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceStage::Disconnected => "disconnected",
            ServiceStage::Connecting => "connecting",
            ServiceStage::Connected => "connected",
            ServiceStage::Disconnecting => "disconnecting",
            ServiceStage::Reconnecting => "reconnecting",
            ServiceStage::Denied => "denied",
            ServiceStage::NoConnection => "no_connection",
        }
    }
}

impl From<NativeState> for ServiceStage {
    fn from(state: NativeState) -> Self {
        match state {
            NativeState::Stopped | NativeState::Paused => ServiceStage::Disconnected,
            NativeState::StopPending | NativeState::PausePending => ServiceStage::Disconnecting,
            NativeState::StartPending => ServiceStage::Connecting,
            NativeState::Running => ServiceStage::Connected,
            NativeState::ContinuePending => ServiceStage::Reconnecting,
            NativeState::Unknown(_) => ServiceStage::NoConnection,
        }
    }
}

impl fmt::Display for ServiceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_mapping() {
        let cases = [
            (1, ServiceStage::Disconnected),
            (2, ServiceStage::Connecting),
            (3, ServiceStage::Disconnecting),
            (4, ServiceStage::Connected),
            (5, ServiceStage::Reconnecting),
            (6, ServiceStage::Disconnecting),
            (7, ServiceStage::Disconnected),
        ];
        for (code, stage) in cases {
            assert_eq!(ServiceStage::from(NativeState::from_code(code)), stage, "code {}", code);
        }
    }

    #[test]
    fn test_unmapped_codes_yield_no_connection() {
        for code in [0, 8, 0xFFFF_FFFF] {
            assert_eq!(
                ServiceStage::from(NativeState::from_code(code)),
                ServiceStage::NoConnection
            );
        }
    }

    #[test]
    fn test_serialized_names_match_display() {
        for stage in [
            ServiceStage::Disconnected,
            ServiceStage::Connecting,
            ServiceStage::Connected,
            ServiceStage::Disconnecting,
            ServiceStage::Reconnecting,
            ServiceStage::Denied,
            ServiceStage::NoConnection,
        ] {
            let json = serde_json::to_value(stage).unwrap();
            assert_eq!(json, serde_json::Value::String(stage.to_string()));
        }
    }
}
