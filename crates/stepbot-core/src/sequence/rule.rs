//! Rules: named conditions that convert a response match into a typed
//! outcome.

use stepbot_types::error::RuleError;
use stepbot_types::http::Response;
use stepbot_types::outcome::Outcome;
use stepbot_types::rule::RuleCondition;

use super::condition::Condition;

/// Which list a rule is registered in within a step.
///
/// The role decides the outcome a match produces: success rules yield
/// [`Outcome::Success`], failure rules yield [`Outcome::Failure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleRole {
    Success,
    Failure,
}

/// A single matching condition attached to a step.
///
/// The break flag is not stored here: whether a match halts the run is
/// step-level policy, passed in by the owning step at evaluation time.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    condition: Option<Condition>,
}

impl Rule {
    /// A rule with no condition yet. Running it fails with
    /// [`RuleError::ConditionNotSet`]; prefer the typed constructors.
    pub fn new() -> Self {
        Self::default()
    }

    /// A rule matching a regex anywhere in the response body.
    pub fn body_matches(pattern: &str) -> Result<Self, RuleError> {
        Ok(Self {
            condition: Some(Condition::body_matches(pattern)?),
        })
    }

    /// A rule matching an exact response status code.
    pub fn status_equals(code: u16) -> Self {
        Self {
            condition: Some(Condition::StatusEquals(code)),
        }
    }

    /// A rule matching any status code except `code`.
    pub fn status_not_equals(code: u16) -> Self {
        Self {
            condition: Some(Condition::StatusNotEquals(code)),
        }
    }

    /// Compile a rule from its declarative form.
    pub fn from_definition(condition: &RuleCondition) -> Result<Self, RuleError> {
        Ok(Self {
            condition: Some(Condition::from_definition(condition)?),
        })
    }

    /// Replace the condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// Evaluate this rule against a response.
    ///
    /// Returns `Ok(None)` when the condition does not match, so the
    /// caller can try the next rule -- distinct from any valid outcome.
    /// On a match, the outcome variant follows `role` and carries the
    /// response plus the step-supplied break flag.
    pub fn run(
        &self,
        role: RuleRole,
        response: &Response,
        breaks_on_match: bool,
    ) -> Result<Option<Outcome>, RuleError> {
        let condition = self.condition.as_ref().ok_or(RuleError::ConditionNotSet)?;

        if !condition.is_match(response) {
            return Ok(None);
        }

        let outcome = match role {
            RuleRole::Success => Outcome::Success {
                response: response.clone(),
                breaks: breaks_on_match,
            },
            RuleRole::Failure => Outcome::Failure {
                response: response.clone(),
                breaks: breaks_on_match,
            },
        };
        Ok(Some(outcome))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
