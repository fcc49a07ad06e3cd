use crate::constants::{
    LABEL_CONNECTION_FAILED, LABEL_HTTP_PREFIX, LABEL_NO_LINK, LABEL_PARSE_ERROR,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Network connectivity as last polled.
///
/// There is no event model: whoever needs the link state asks the link
/// manager for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    Connected,
    Disconnected,
}

impl LinkState {
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl From<bool> for LinkState {
    fn from(connected: bool) -> Self {
        if connected {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// Result of one verification attempt.
///
/// Built fresh for every attempt and consumed by the controller to pick an
/// actuation. `subject_label` is always populated: it holds the identity on a
/// decoded response and the failure reason otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    /// True iff an HTTP-level response was received and decoded.
    pub transport_succeeded: bool,

    /// Access decision, meaningful only when `transport_succeeded`.
    pub authorized: bool,

    /// Identity or failure reason.
    pub subject_label: String,

    /// Match confidence in `[0.0, 1.0]`.
    pub confidence: f32,
}

impl VerificationOutcome {
    /// Outcome of a decoded server response.
    ///
    /// Confidence is clamped into `[0.0, 1.0]`.
    pub fn decision(authorized: bool, subject_label: impl Into<String>, confidence: f32) -> Self {
        Self {
            transport_succeeded: true,
            authorized,
            subject_label: subject_label.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Outcome of an attempt that never produced a usable response.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            transport_succeeded: false,
            authorized: false,
            subject_label: reason.into(),
            confidence: 0.0,
        }
    }

    /// Verification was skipped because the link is down.
    #[must_use]
    pub fn no_link() -> Self {
        Self::failure(LABEL_NO_LINK)
    }

    /// The request did not complete.
    #[must_use]
    pub fn connection_failed() -> Self {
        Self::failure(LABEL_CONNECTION_FAILED)
    }

    /// The server answered with a non-success status.
    #[must_use]
    pub fn http_status(code: u16) -> Self {
        Self::failure(format!("{LABEL_HTTP_PREFIX} {code}"))
    }

    /// The server answered 2xx with a body of the wrong shape.
    #[must_use]
    pub fn parse_error() -> Self {
        Self::failure(LABEL_PARSE_ERROR)
    }

    /// Whether this outcome opens the door.
    #[must_use]
    pub fn is_grant(&self) -> bool {
        self.transport_succeeded && self.authorized
    }
}

/// Physical feedback requested from the actuator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActuationCommand {
    Grant { label: String },
    Deny { reason: String },
}

impl ActuationCommand {
    /// Pick the actuation for an outcome.
    ///
    /// Every failure path, transport or decision, becomes a `Deny` carrying the
    /// outcome's label as reason.
    pub fn from_outcome(outcome: &VerificationOutcome) -> Self {
        if outcome.is_grant() {
            Self::Grant {
                label: outcome.subject_label.clone(),
            }
        } else {
            Self::Deny {
                reason: outcome.subject_label.clone(),
            }
        }
    }

    #[must_use]
    pub fn is_grant(&self) -> bool {
        matches!(self, Self::Grant { .. })
    }
}

impl From<&VerificationOutcome> for ActuationCommand {
    fn from(outcome: &VerificationOutcome) -> Self {
        Self::from_outcome(outcome)
    }
}

impl fmt::Display for ActuationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grant { label } => write!(f, "grant ({label})"),
            Self::Deny { reason } => write!(f, "deny ({reason})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_link_state_from_bool() {
        assert_eq!(LinkState::from(true), LinkState::Connected);
        assert_eq!(LinkState::from(false), LinkState::Disconnected);
        assert!(LinkState::Connected.is_connected());
        assert!(!LinkState::Disconnected.is_connected());
    }

    #[test]
    fn test_decision_outcome() {
        let outcome = VerificationOutcome::decision(true, "Alice", 0.93);
        assert!(outcome.transport_succeeded);
        assert!(outcome.authorized);
        assert_eq!(outcome.subject_label, "Alice");
        assert!((outcome.confidence - 0.93).abs() < f32::EPSILON);
        assert!(outcome.is_grant());
    }

    #[rstest]
    #[case(1.7, 1.0)]
    #[case(-0.2, 0.0)]
    #[case(0.5, 0.5)]
    fn test_decision_clamps_confidence(#[case] raw: f32, #[case] expected: f32) {
        let outcome = VerificationOutcome::decision(false, "Bob", raw);
        assert_eq!(outcome.confidence, expected);
    }

    #[rstest]
    #[case(VerificationOutcome::no_link(), "No WiFi")]
    #[case(VerificationOutcome::connection_failed(), "Connection failed")]
    #[case(VerificationOutcome::http_status(500), "HTTP 500")]
    #[case(VerificationOutcome::http_status(404), "HTTP 404")]
    #[case(VerificationOutcome::parse_error(), "Parse error")]
    fn test_failure_labels(#[case] outcome: VerificationOutcome, #[case] label: &str) {
        assert!(!outcome.transport_succeeded);
        assert!(!outcome.authorized);
        assert!(!outcome.is_grant());
        assert_eq!(outcome.subject_label, label);
        assert_eq!(outcome.confidence, 0.0);
    }

    #[test]
    fn test_command_from_grant_outcome() {
        let outcome = VerificationOutcome::decision(true, "Alice", 0.93);
        assert_eq!(
            ActuationCommand::from(&outcome),
            ActuationCommand::Grant {
                label: "Alice".to_string()
            }
        );
    }

    #[test]
    fn test_command_from_server_denial() {
        let outcome = VerificationOutcome::decision(false, "Unknown", 0.1);
        assert_eq!(
            ActuationCommand::from(&outcome),
            ActuationCommand::Deny {
                reason: "Unknown".to_string()
            }
        );
    }

    #[test]
    fn test_failure_never_grants_even_if_authorized_set() {
        let mut outcome = VerificationOutcome::parse_error();
        outcome.authorized = true;

        let command = ActuationCommand::from_outcome(&outcome);
        assert!(!command.is_grant());
        assert_eq!(command.to_string(), "deny (Parse error)");
    }
}
