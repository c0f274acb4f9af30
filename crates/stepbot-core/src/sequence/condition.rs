//! Compiled rule conditions and their evaluation.
//!
//! The declarative form ([`RuleCondition`]) carries a pattern string;
//! compiling here means an invalid pattern fails configuration, not a
//! run already in flight.

use regex::Regex;
use stepbot_types::error::RuleError;
use stepbot_types::http::Response;
use stepbot_types::rule::RuleCondition;

/// A rule condition compiled for repeated evaluation.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Regex match anywhere in the response body text.
    BodyMatches(Regex),
    /// Response status code equals the expected code.
    StatusEquals(u16),
    /// Response status code differs from the expected code.
    StatusNotEquals(u16),
}

impl Condition {
    /// Compile a body-matching condition from a regex pattern.
    pub fn body_matches(pattern: &str) -> Result<Self, RuleError> {
        let regex = Regex::new(pattern).map_err(|e| RuleError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Condition::BodyMatches(regex))
    }

    /// Compile a condition from its declarative form.
    pub fn from_definition(condition: &RuleCondition) -> Result<Self, RuleError> {
        match condition {
            RuleCondition::BodyMatches { pattern } => Self::body_matches(pattern),
            RuleCondition::StatusEquals { code } => Ok(Condition::StatusEquals(*code)),
            RuleCondition::StatusNotEquals { code } => Ok(Condition::StatusNotEquals(*code)),
        }
    }

    /// Evaluate this condition against a response.
    ///
    /// Pure: identical (condition, response) pairs always yield the same
    /// answer. The first regex match is sufficient; matches are not
    /// enumerated.
    pub fn is_match(&self, response: &Response) -> bool {
        match self {
            Condition::BodyMatches(regex) => regex.is_match(&response.text()),
            Condition::StatusEquals(code) => response.status == *code,
            Condition::StatusNotEquals(code) => response.status != *code,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
