//! Declarative rule conditions.
//!
//! A [`RuleCondition`] is the serde-able form of a rule's matching
//! condition: a tagged union with a typed payload per kind. The engine
//! compiles it into an evaluatable form; this crate only defines the
//! closed set of kinds and the configuration-time validation of the
//! string entry point.

use serde::{Deserialize, Serialize};

use crate::error::RuleError;

/// A rule's matching condition, with a typed payload per kind.
///
/// Internally tagged to match the YAML surface:
/// ```yaml
/// type: body_matches
/// pattern: "Welcome back"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleCondition {
    /// Regex match anywhere in the response body text.
    BodyMatches { pattern: String },
    /// Response status code equals `code`.
    StatusEquals { code: u16 },
    /// Response status code differs from `code`. Used to express
    /// "anything but" a given status.
    StatusNotEquals { code: u16 },
}

impl RuleCondition {
    /// The closed set of kind names accepted by [`RuleCondition::parse`].
    pub const KINDS: [&'static str; 3] = ["body_matches", "status_equals", "status_not_equals"];

    /// Build a condition from a kind name and its parameter string.
    ///
    /// Unknown kinds are rejected here, at configuration time, so an
    /// invalid rule can never reach evaluation.
    pub fn parse(kind: &str, parameters: &str) -> Result<Self, RuleError> {
        match kind {
            "body_matches" => Ok(RuleCondition::BodyMatches {
                pattern: parameters.to_string(),
            }),
            "status_equals" => Ok(RuleCondition::StatusEquals {
                code: parse_code(kind, parameters)?,
            }),
            "status_not_equals" => Ok(RuleCondition::StatusNotEquals {
                code: parse_code(kind, parameters)?,
            }),
            other => Err(RuleError::UndefinedType(other.to_string())),
        }
    }

    /// The kind name of this condition.
    pub fn kind(&self) -> &'static str {
        match self {
            RuleCondition::BodyMatches { .. } => "body_matches",
            RuleCondition::StatusEquals { .. } => "status_equals",
            RuleCondition::StatusNotEquals { .. } => "status_not_equals",
        }
    }
}

fn parse_code(kind: &str, parameters: &str) -> Result<u16, RuleError> {
    parameters
        .trim()
        .parse()
        .map_err(|_| RuleError::InvalidParameters {
            kind: kind.to_string(),
            reason: format!("expected a status code, got '{parameters}'"),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
