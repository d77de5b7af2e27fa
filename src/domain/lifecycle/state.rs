//! Lifecycle states for a single user-triggered request.
//!
//! A controller holds exactly one [`RequestLifecycleState`] at a time. Each
//! submission is tagged with a fresh [`Generation`]; only a settlement that
//! carries the generation of the current `InFlight` state may change it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Monotonically increasing tag identifying one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(pub u64);

impl Generation {
    /// Generation before any submission has been made.
    pub const INITIAL: Generation = Generation(0);

    /// The generation that follows this one.
    pub fn next(self) -> Generation {
        Generation(self.0.saturating_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reason why a remote call failed.
///
/// Every variant resolves to the `Failed` lifecycle state; none is fatal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum FailureReason {
    /// Transport-level failure: no response was received.
    NetworkFailure { error: String },

    /// A response was received with a non-success status code.
    HttpFailure { status: u16, body: String },

    /// A response body was present but could not be parsed as JSON.
    DecodeFailure { error: String },

    /// The body parsed but did not have the expected fields.
    ShapeMismatch { detail: String },

    /// The configured deadline elapsed before the request settled.
    Timeout { after_ms: u64 },
}

impl FailureReason {
    /// Returns true if resubmitting the same request could plausibly succeed.
    ///
    /// Advisory only: the controller never retries on its own.
    pub fn is_retriable(&self) -> bool {
        match self {
            FailureReason::NetworkFailure { .. } => true,
            FailureReason::HttpFailure { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            FailureReason::DecodeFailure { .. } => false,
            FailureReason::ShapeMismatch { .. } => false,
            FailureReason::Timeout { .. } => true,
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FailureReason::NetworkFailure { .. } => "network",
            FailureReason::HttpFailure { .. } => "http",
            FailureReason::DecodeFailure { .. } => "decode",
            FailureReason::ShapeMismatch { .. } => "shape",
            FailureReason::Timeout { .. } => "timeout",
        }
    }

    /// Returns a human-readable error message for this failure reason.
    pub fn to_error_message(&self) -> String {
        match self {
            FailureReason::NetworkFailure { error } => {
                format!("Could not reach the service: {}", error)
            }
            FailureReason::HttpFailure { status, .. } => {
                format!("Request failed with status {}", status)
            }
            FailureReason::DecodeFailure { .. } => {
                "The service returned a response that could not be read".to_string()
            }
            FailureReason::ShapeMismatch { detail } => {
                format!("The service returned an unexpected response: {}", detail)
            }
            FailureReason::Timeout { after_ms } => {
                format!("The service did not respond within {} ms", after_ms)
            }
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_error_message())
    }
}

/// State of one controller's request lifecycle.
///
/// `Idle → InFlight → {Succeeded, Failed}`; a later submission moves a
/// settled state straight back to `InFlight`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value")]
pub enum RequestLifecycleState<P> {
    Idle,
    InFlight { generation: Generation },
    Succeeded(P),
    Failed(FailureReason),
}

impl<P> Default for RequestLifecycleState<P> {
    fn default() -> Self {
        RequestLifecycleState::Idle
    }
}

impl<P> RequestLifecycleState<P> {
    /// Get the variant name of the current state.
    pub fn variant(&self) -> &'static str {
        match self {
            RequestLifecycleState::Idle => "Idle",
            RequestLifecycleState::InFlight { .. } => "InFlight",
            RequestLifecycleState::Succeeded(_) => "Succeeded",
            RequestLifecycleState::Failed(_) => "Failed",
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, RequestLifecycleState::InFlight { .. })
    }

    /// Check if the last request has settled (Succeeded or Failed).
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            RequestLifecycleState::Succeeded(_) | RequestLifecycleState::Failed(_)
        )
    }

    /// Generation of the outstanding request, if one is in flight.
    pub fn in_flight_generation(&self) -> Option<Generation> {
        match self {
            RequestLifecycleState::InFlight { generation } => Some(*generation),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&P> {
        match self {
            RequestLifecycleState::Succeeded(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            RequestLifecycleState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}
