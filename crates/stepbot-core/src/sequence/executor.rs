//! Sequential executor: runs named steps in registration order and
//! stops at the first outcome that breaks.
//!
//! # Execution flow
//!
//! 1. Steps run strictly in the order they were added.
//! 2. Before a step runs, its recorded outcome and response slots are
//!    cleared; they are re-filled right after it completes.
//! 3. An outcome with `breaks == true` halts the run; later steps are
//!    neither executed nor initialized.
//! 4. Re-running starts over from the first step. There is no
//!    memoization across runs.
//!
//! The transport (and its cookie/session state) is owned by the
//! executor and shared by reference across every step of a run, so
//! session state established early (login cookies) is visible to later
//! steps.

use std::collections::HashMap;

use stepbot_types::error::{RuleError, TransportError};
use stepbot_types::http::Response;
use stepbot_types::outcome::Outcome;
use uuid::Uuid;

use super::step::{Step, StepRunError};
use crate::transport::Transport;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that abort a sequence run.
///
/// Transport and rule failures pass through transparently; the executor
/// adds no wrapping, retry, or fallback. A failing step aborts the run
/// at that point.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Rule(#[from] RuleError),
}

impl From<StepRunError> for ExecutorError {
    fn from(err: StepRunError) -> Self {
        match err {
            StepRunError::Transport(e) => ExecutorError::Transport(e),
            StepRunError::Rule(e) => ExecutorError::Rule(e),
        }
    }
}

/// Errors from querying run state for a step that never executed.
///
/// Recoverable: a step skipped because an earlier step broke the run
/// reports this rather than a silent default.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("no result recorded for step '{0}'")]
    ResultNotSet(String),

    #[error("no response recorded for step '{0}'")]
    ResponseNotSet(String),
}

// ---------------------------------------------------------------------------
// RunReport
// ---------------------------------------------------------------------------

/// Summary of one completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// UUIDv7 id of this run, also attached to its log events.
    pub run_id: Uuid,
    /// Names of the steps that executed, in order.
    pub executed: Vec<String>,
    /// The step whose outcome halted the run, if any.
    pub halted_at: Option<String>,
}

// ---------------------------------------------------------------------------
// SequenceExecutor
// ---------------------------------------------------------------------------

/// Owns the ordered, named collection of steps and drives sequential
/// execution.
///
/// Callers read outcomes and responses back through the accessor
/// methods, keyed by step name; the executor owns the underlying maps
/// exclusively.
pub struct SequenceExecutor<T: Transport> {
    transport: T,
    steps: Vec<(String, Step)>,
    results: HashMap<String, Outcome>,
    responses: HashMap<String, Response>,
}

impl<T: Transport> SequenceExecutor<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            steps: Vec::new(),
            results: HashMap::new(),
            responses: HashMap::new(),
        }
    }

    /// Add a named step. Insertion order is execution order; re-adding
    /// an existing name replaces that step in place, keeping its
    /// position.
    pub fn add_step(mut self, name: impl Into<String>, step: Step) -> Self {
        let name = name.into();
        if let Some(slot) = self.steps.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = step;
        } else {
            self.steps.push((name, step));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The shared transport, e.g. for inspecting session state.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run the sequence from the beginning.
    ///
    /// Stops early when a step's outcome breaks, or when a transport or
    /// rule error surfaces; the error case leaves earlier steps'
    /// recorded state intact.
    pub async fn run(&mut self) -> Result<RunReport, ExecutorError> {
        let run_id = Uuid::now_v7();
        let started = std::time::Instant::now();
        tracing::info!(run_id = %run_id, steps = self.steps.len(), "starting sequence run");

        let mut executed = Vec::new();
        let mut halted_at = None;

        for idx in 0..self.steps.len() {
            let name = self.steps[idx].0.clone();
            let step = &self.steps[idx].1;

            // Cleared right before the step runs, so a break leaves the
            // slots of unreached steps untouched.
            self.results.remove(&name);
            self.responses.remove(&name);

            tracing::debug!(run_id = %run_id, step = name.as_str(), "executing step");
            let outcome = match step.run(&self.transport).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(
                        run_id = %run_id,
                        step = name.as_str(),
                        error = %e,
                        "step failed"
                    );
                    return Err(e.into());
                }
            };

            tracing::debug!(
                run_id = %run_id,
                step = name.as_str(),
                outcome = outcome.kind(),
                breaks = outcome.breaks(),
                "step completed"
            );

            let breaks = outcome.breaks();
            self.responses.insert(name.clone(), outcome.response().clone());
            self.results.insert(name.clone(), outcome);
            executed.push(name.clone());

            if breaks {
                tracing::info!(run_id = %run_id, step = name.as_str(), "outcome breaks the run");
                halted_at = Some(name);
                break;
            }
        }

        tracing::info!(
            run_id = %run_id,
            executed = executed.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "sequence run finished"
        );

        Ok(RunReport {
            run_id,
            executed,
            halted_at,
        })
    }

    /// The outcome recorded for a step in the most recent run that
    /// reached it.
    pub fn step_result(&self, name: &str) -> Result<&Outcome, LookupError> {
        self.results
            .get(name)
            .ok_or_else(|| LookupError::ResultNotSet(name.to_string()))
    }

    /// All recorded outcomes, keyed by step name.
    pub fn step_results(&self) -> &HashMap<String, Outcome> {
        &self.results
    }

    /// The response recorded for a step in the most recent run that
    /// reached it.
    pub fn response(&self, name: &str) -> Result<&Response, LookupError> {
        self.responses
            .get(name)
            .ok_or_else(|| LookupError::ResponseNotSet(name.to_string()))
    }

    /// The recorded response body for a step.
    pub fn response_body(&self, name: &str) -> Result<&[u8], LookupError> {
        self.response(name).map(|r| r.body.as_slice())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use stepbot_types::http::RequestSpec;

    use crate::sequence::rule::Rule;

    /// Transport that replays canned responses and records requests.
    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<Response, TransportError>>>,
        requests: Mutex<Vec<RequestSpec>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<Result<Response, TransportError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl Transport for ScriptedTransport {
        async fn send(&self, request: &RequestSpec) -> Result<Response, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Response::empty()))
        }
    }

    fn body_response(body: &str) -> Response {
        Response::new(200, HashMap::new(), body.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_runs_steps_in_registration_order() {
        let transport = ScriptedTransport::new(vec![
            Ok(body_response("first")),
            Ok(body_response("second")),
        ]);
        let mut executor = SequenceExecutor::new(transport)
            .add_step("one", Step::get("https://example.com/1").build())
            .add_step("two", Step::get("https://example.com/2").build());

        let report = executor.run().await.unwrap();
        assert_eq!(report.executed, vec!["one", "two"]);
        assert!(report.halted_at.is_none());
        assert_eq!(executor.response_body("one").unwrap(), b"first");
        assert_eq!(executor.response_body("two").unwrap(), b"second");

        let urls: Vec<String> = executor
            .transport()
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.clone())
            .collect();
        assert_eq!(urls, vec!["https://example.com/1", "https://example.com/2"]);
    }

    #[tokio::test]
    async fn test_breaking_failure_halts_later_steps() {
        let transport = ScriptedTransport::new(vec![
            Ok(body_response("fatal marker")),
            Ok(body_response("never requested")),
        ]);
        let mut executor = SequenceExecutor::new(transport)
            .add_step(
                "gate",
                Step::get("https://example.com/gate")
                    .failure_rule("fatal", Rule::body_matches("fatal").unwrap())
                    .break_on_failure(true)
                    .build(),
            )
            .add_step("after", Step::get("https://example.com/after").build());

        let report = executor.run().await.unwrap();
        assert_eq!(report.executed, vec!["gate"]);
        assert_eq!(report.halted_at.as_deref(), Some("gate"));

        let outcome = executor.step_result("gate").unwrap();
        assert!(outcome.is_failure());
        assert!(outcome.breaks());

        // The second step never executed: lookups fail, no request sent.
        assert!(matches!(
            executor.step_result("after"),
            Err(LookupError::ResultNotSet(_))
        ));
        assert!(matches!(
            executor.response_body("after"),
            Err(LookupError::ResponseNotSet(_))
        ));
        assert_eq!(executor.transport().request_count(), 1);
    }

    #[tokio::test]
    async fn test_non_breaking_failure_continues() {
        let transport = ScriptedTransport::new(vec![
            Ok(body_response("fatal marker")),
            Ok(body_response("still ran")),
        ]);
        let mut executor = SequenceExecutor::new(transport)
            .add_step(
                "gate",
                Step::get("https://example.com/gate")
                    .failure_rule("fatal", Rule::body_matches("fatal").unwrap())
                    .build(),
            )
            .add_step("after", Step::get("https://example.com/after").build());

        let report = executor.run().await.unwrap();
        assert_eq!(report.executed, vec!["gate", "after"]);
        assert!(executor.step_result("gate").unwrap().is_failure());
        assert!(executor.step_result("after").unwrap().is_continue());
    }

    #[tokio::test]
    async fn test_breaking_success_halts_run() {
        let transport = ScriptedTransport::new(vec![Ok(body_response("Welcome back"))]);
        let mut executor = SequenceExecutor::new(transport)
            .add_step(
                "login",
                Step::post("https://example.com/login")
                    .success_rule("greeted", Rule::body_matches("Welcome").unwrap())
                    .break_on_success(true)
                    .build(),
            )
            .add_step("scrape", Step::get("https://example.com/data").build());

        let report = executor.run().await.unwrap();
        assert_eq!(report.halted_at.as_deref(), Some("login"));
        assert!(executor.step_result("login").unwrap().is_success());
        assert!(executor.step_result("scrape").is_err());
    }

    #[tokio::test]
    async fn test_transport_error_aborts_run() {
        let transport = ScriptedTransport::new(vec![
            Ok(body_response("fine")),
            Err(TransportError::Send {
                url: "https://example.com/2".to_string(),
                reason: "connection refused".to_string(),
            }),
        ]);
        let mut executor = SequenceExecutor::new(transport)
            .add_step("one", Step::get("https://example.com/1").build())
            .add_step("two", Step::get("https://example.com/2").build())
            .add_step("three", Step::get("https://example.com/3").build());

        let err = executor.run().await.unwrap_err();
        assert!(matches!(err, ExecutorError::Transport(_)));

        // The first step's state survives; the failing and later steps
        // recorded nothing.
        assert!(executor.step_result("one").is_ok());
        assert!(executor.step_result("two").is_err());
        assert!(executor.step_result("three").is_err());
        assert_eq!(executor.transport().request_count(), 2);
    }

    #[tokio::test]
    async fn test_re_adding_a_name_overwrites_in_place() {
        let transport = ScriptedTransport::new(vec![Ok(body_response("a")), Ok(body_response("b"))]);
        let mut executor = SequenceExecutor::new(transport)
            .add_step("first", Step::get("https://example.com/old").build())
            .add_step("second", Step::get("https://example.com/2").build())
            .add_step("first", Step::get("https://example.com/new").build());

        assert_eq!(executor.len(), 2);
        let report = executor.run().await.unwrap();
        assert_eq!(report.executed, vec!["first", "second"]);

        let urls: Vec<String> = executor
            .transport()
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.clone())
            .collect();
        assert_eq!(urls, vec!["https://example.com/new", "https://example.com/2"]);
    }

    #[tokio::test]
    async fn test_rerun_re_executes_from_the_beginning() {
        let transport = ScriptedTransport::new(vec![
            Ok(body_response("run1")),
            Ok(body_response("run2")),
        ]);
        let mut executor = SequenceExecutor::new(transport)
            .add_step("only", Step::get("https://example.com").build());

        executor.run().await.unwrap();
        assert_eq!(executor.response_body("only").unwrap(), b"run1");

        executor.run().await.unwrap();
        assert_eq!(executor.response_body("only").unwrap(), b"run2");
        assert_eq!(executor.transport().request_count(), 2);
    }

    #[tokio::test]
    async fn test_step_results_exposes_full_map() {
        let transport = ScriptedTransport::new(vec![
            Ok(body_response("a")),
            Ok(body_response("b")),
        ]);
        let mut executor = SequenceExecutor::new(transport)
            .add_step("one", Step::get("https://example.com/1").build())
            .add_step("two", Step::get("https://example.com/2").build());

        executor.run().await.unwrap();
        let results = executor.step_results();
        assert_eq!(results.len(), 2);
        assert!(results.contains_key("one"));
        assert!(results.contains_key("two"));
    }

    #[tokio::test]
    async fn test_empty_executor_runs_cleanly() {
        let transport = ScriptedTransport::new(Vec::new());
        let mut executor: SequenceExecutor<ScriptedTransport> = SequenceExecutor::new(transport);
        assert!(executor.is_empty());

        let report = executor.run().await.unwrap();
        assert!(report.executed.is_empty());
        assert!(report.halted_at.is_none());
    }

    #[tokio::test]
    async fn test_lookup_before_any_run_fails() {
        let transport = ScriptedTransport::new(Vec::new());
        let executor = SequenceExecutor::new(transport)
            .add_step("pending", Step::get("https://example.com").build());

        let err = executor.step_result("pending").unwrap_err();
        assert!(err.to_string().contains("pending"));
        assert!(executor.response("pending").is_err());
    }
}
