//! The three-state result of running a step.

use serde::{Deserialize, Serialize};

use crate::http::Response;

/// The result of running a step: exactly one outcome per execution.
///
/// Every variant carries the response that was evaluated and a flag
/// telling the executor whether to stop the sequence. `Continue` with
/// `breaks: false` is the default when no rule matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    /// No rule matched; the sequence moves on.
    Continue { response: Response, breaks: bool },
    /// A success rule matched.
    Success { response: Response, breaks: bool },
    /// A failure rule matched.
    Failure { response: Response, breaks: bool },
}

impl Outcome {
    /// The response this outcome carries.
    pub fn response(&self) -> &Response {
        match self {
            Outcome::Continue { response, .. }
            | Outcome::Success { response, .. }
            | Outcome::Failure { response, .. } => response,
        }
    }

    /// Whether the executor must stop the sequence after this step.
    pub fn breaks(&self) -> bool {
        match self {
            Outcome::Continue { breaks, .. }
            | Outcome::Success { breaks, .. }
            | Outcome::Failure { breaks, .. } => *breaks,
        }
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, Outcome::Continue { .. })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure { .. })
    }

    /// Lower-case variant name, for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Continue { .. } => "continue",
            Outcome::Success { .. } => "success",
            Outcome::Failure { .. } => "failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let outcome = Outcome::Failure {
            response: Response::new(403, Default::default(), b"denied".to_vec()),
            breaks: true,
        };
        assert!(outcome.is_failure());
        assert!(!outcome.is_success());
        assert!(outcome.breaks());
        assert_eq!(outcome.response().status, 403);
        assert_eq!(outcome.kind(), "failure");
    }

    #[test]
    fn test_continue_default_shape() {
        let outcome = Outcome::Continue {
            response: Response::empty(),
            breaks: false,
        };
        assert!(outcome.is_continue());
        assert!(!outcome.breaks());
    }
}
