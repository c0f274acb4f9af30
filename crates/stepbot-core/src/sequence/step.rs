//! Steps: one configured HTTP request plus its attached rules.
//!
//! A [`Step`] is immutable once built. Configuration happens on
//! [`StepBuilder`], which validates eagerly: an invalid method never
//! produces a builder at all.

use std::collections::HashMap;

use stepbot_types::error::{RuleError, StepConfigError, TransportError};
use stepbot_types::http::{Method, RequestSpec};
use stepbot_types::outcome::Outcome;

use super::rule::{Rule, RuleRole};
use crate::transport::Transport;

// ---------------------------------------------------------------------------
// StepRunError
// ---------------------------------------------------------------------------

/// Errors that can occur while running a step.
///
/// Both variants are transparent: transport failures and rule
/// configuration failures surface to the caller unmodified.
#[derive(Debug, thiserror::Error)]
pub enum StepRunError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Rule(#[from] RuleError),
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// One configured HTTP request plus its ordered success and failure
/// rules.
///
/// Executing a step produces exactly one [`Outcome`]: the first matching
/// success rule wins, then the first matching failure rule, otherwise
/// `Continue`.
#[derive(Debug, Clone)]
pub struct Step {
    method: Method,
    url: String,
    headers: HashMap<String, String>,
    body: Option<String>,
    form_params: HashMap<String, String>,
    query_params: HashMap<String, String>,
    timeout_secs: Option<u64>,
    success_rules: Vec<(String, Rule)>,
    failure_rules: Vec<(String, Rule)>,
    break_on_success: bool,
    break_on_failure: bool,
}

impl Step {
    /// Start building a step with an already-typed method.
    pub fn builder(method: Method, url: impl Into<String>) -> StepBuilder {
        StepBuilder {
            step: Step {
                method,
                url: url.into(),
                headers: HashMap::new(),
                body: None,
                form_params: HashMap::new(),
                query_params: HashMap::new(),
                timeout_secs: None,
                success_rules: Vec::new(),
                failure_rules: Vec::new(),
                break_on_success: false,
                break_on_failure: false,
            },
        }
    }

    /// Shortcut for a GET step.
    pub fn get(url: impl Into<String>) -> StepBuilder {
        Self::builder(Method::Get, url)
    }

    /// Shortcut for a POST step.
    pub fn post(url: impl Into<String>) -> StepBuilder {
        Self::builder(Method::Post, url)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout_secs(&self) -> Option<u64> {
        self.timeout_secs
    }

    pub fn breaks_on_success(&self) -> bool {
        self.break_on_success
    }

    pub fn breaks_on_failure(&self) -> bool {
        self.break_on_failure
    }

    /// The request this step sends, as the transport sees it.
    pub fn request_spec(&self) -> RequestSpec {
        RequestSpec {
            method: self.method,
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
            form_params: self.form_params.clone(),
            query_params: self.query_params.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    /// Send the request and evaluate rules in priority order.
    ///
    /// Success rules run first, in registration order, and the first
    /// match short-circuits; failure rules are the safety net, evaluated
    /// only when nothing indicated success. With no match at all the
    /// step yields `Continue { breaks: false }`.
    ///
    /// Transport failures propagate unmodified; the step neither
    /// suppresses nor retries them.
    pub async fn run<T: Transport>(&self, transport: &T) -> Result<Outcome, StepRunError> {
        let request = self.request_spec();
        tracing::debug!(
            method = self.method.as_str(),
            url = self.url.as_str(),
            "sending step request"
        );
        let response = transport.send(&request).await?;
        tracing::debug!(
            status = response.status,
            body_len = response.body.len(),
            "step response received"
        );

        for (name, rule) in &self.success_rules {
            if let Some(outcome) = rule.run(RuleRole::Success, &response, self.break_on_success)? {
                tracing::debug!(rule = name.as_str(), "success rule matched");
                return Ok(outcome);
            }
        }

        for (name, rule) in &self.failure_rules {
            if let Some(outcome) = rule.run(RuleRole::Failure, &response, self.break_on_failure)? {
                tracing::debug!(rule = name.as_str(), "failure rule matched");
                return Ok(outcome);
            }
        }

        Ok(Outcome::Continue {
            response,
            breaks: false,
        })
    }
}

// ---------------------------------------------------------------------------
// StepBuilder
// ---------------------------------------------------------------------------

/// Fluent configuration for a [`Step`].
///
/// Setters that can fail (the method string) validate at the call site;
/// everything else is infallible, so `build` never errors.
#[derive(Debug, Clone)]
pub struct StepBuilder {
    step: Step,
}

impl StepBuilder {
    /// Start from a method name. Case-insensitive; anything outside the
    /// standard HTTP verb set is rejected here, before a builder exists.
    pub fn new(method: &str, url: impl Into<String>) -> Result<Self, StepConfigError> {
        let method: Method = method.parse()?;
        Ok(Step::builder(method, url))
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.step.headers.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.step.body = Some(body.into());
        self
    }

    pub fn form_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.step.form_params.insert(name.into(), value.into());
        self
    }

    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.step.query_params.insert(name.into(), value.into());
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.step.timeout_secs = Some(timeout_secs);
        self
    }

    /// Attach a named success rule. Order of attachment is evaluation
    /// order.
    pub fn success_rule(mut self, name: impl Into<String>, rule: Rule) -> Self {
        self.step.success_rules.push((name.into(), rule));
        self
    }

    /// Attach a named failure rule. Order of attachment is evaluation
    /// order.
    pub fn failure_rule(mut self, name: impl Into<String>, rule: Rule) -> Self {
        self.step.failure_rules.push((name.into(), rule));
        self
    }

    pub fn break_on_success(mut self, breaks: bool) -> Self {
        self.step.break_on_success = breaks;
        self
    }

    pub fn break_on_failure(mut self, breaks: bool) -> Self {
        self.step.break_on_failure = breaks;
        self
    }

    pub fn build(self) -> Step {
        self.step
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
