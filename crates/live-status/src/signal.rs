//! Tri-state live classification.

use serde::{Deserialize, Serialize};

/// Outcome of a live check for one account.
///
/// `Unknown` means the check failed or was inconclusive. It is deliberately
/// distinct from `Offline`: a stored signal is only ever replaced by a
/// definitive one (see [`LiveSignal::merge`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveSignal {
    Live,
    Offline,
    #[default]
    Unknown,
}

impl LiveSignal {
    pub fn is_live(&self) -> bool {
        matches!(self, LiveSignal::Live)
    }

    /// Whether this is a definitive answer (live or offline).
    pub fn is_known(&self) -> bool {
        !matches!(self, LiveSignal::Unknown)
    }

    /// Combine a fresh result with the previously stored one.
    ///
    /// Unknown never regresses known state: the previous value is kept.
    pub fn merge(self, previous: Option<LiveSignal>) -> Option<LiveSignal> {
        if self.is_known() { Some(self) } else { previous }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LiveSignal::Live => "live",
            LiveSignal::Offline => "offline",
            LiveSignal::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for LiveSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single probe for one (platform, username) pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProbeResult {
    pub signal: LiveSignal,
    /// Marker or payload fragment that decided the signal, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

impl ProbeResult {
    pub fn live(evidence: impl Into<String>) -> Self {
        Self {
            signal: LiveSignal::Live,
            evidence: Some(evidence.into()),
        }
    }

    pub fn offline(evidence: impl Into<String>) -> Self {
        Self {
            signal: LiveSignal::Offline,
            evidence: Some(evidence.into()),
        }
    }

    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_known(&self) -> bool {
        self.signal.is_known()
    }
}
