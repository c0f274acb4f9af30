//! Declarative sequence IR.
//!
//! The serde twin of the runtime engine types: a [`SequenceDefinition`]
//! describes an ordered list of named steps, each with its rules and
//! break flags. YAML files and programmatic construction both produce
//! this IR; the engine compiles it into runnable steps.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::http::Method;
use crate::rule::RuleCondition;

/// A named, ordered sequence of HTTP request steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceDefinition {
    /// Sequence name. Alphanumeric and hyphens only.
    pub name: String,
    /// Optional longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Steps in execution order. Order is significant and preserved.
    pub steps: Vec<StepDefinition>,
}

/// One configured HTTP request plus its attached rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Step name, unique within a sequence. Results are recorded under
    /// this name.
    pub name: String,
    pub method: Method,
    /// Target URL, stored verbatim (case-sensitive).
    pub url: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub form_params: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub query_params: HashMap<String, String>,
    /// Per-step request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Evaluated in order, before any failure rule.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub success_rules: Vec<RuleDefinition>,
    /// Evaluated in order, only when no success rule matched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failure_rules: Vec<RuleDefinition>,
    /// Halt the sequence when a success rule matches.
    #[serde(default)]
    pub break_on_success: bool,
    /// Halt the sequence when a failure rule matches.
    #[serde(default)]
    pub break_on_failure: bool,
}

/// A named rule: a condition attached to a step under a caller-chosen
/// name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub name: String,
    #[serde(flatten)]
    pub condition: RuleCondition,
}
