use thiserror::Error;

/// Errors raised while configuring a step.
#[derive(Debug, Error)]
pub enum StepConfigError {
    /// The method is not one of the standard HTTP verbs.
    #[error("invalid HTTP method for step: '{0}'")]
    InvalidMethod(String),
}

/// Errors raised while configuring or evaluating a rule.
///
/// Configuration-time validation is the primary guard: the typed
/// constructors make most of these unreachable at evaluation time.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The kind name is not in the closed rule-kind set.
    #[error("undefined rule type: '{0}'")]
    UndefinedType(String),

    /// The parameter string cannot be interpreted for this kind.
    #[error("invalid parameters for rule type '{kind}': {reason}")]
    InvalidParameters { kind: String, reason: String },

    /// The regex pattern failed to compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A rule was run before any condition was set.
    #[error("rule has no condition set")]
    ConditionNotSet,
}

/// Failures at the HTTP transport boundary.
///
/// These are never wrapped or retried; they surface to the caller as-is
/// and abort the run at the failing step.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// The request could not be built or sent.
    #[error("request to '{url}' failed: {reason}")]
    Send { url: String, reason: String },

    /// The send exceeded the step's timeout.
    #[error("request to '{url}' timed out")]
    Timeout { url: String },

    /// The response body could not be read.
    #[error("failed to read response body from '{url}': {reason}")]
    Body { url: String, reason: String },
}
