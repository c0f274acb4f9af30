//! Sequence definition parsing, validation, and filesystem operations.
//!
//! Converts between YAML files and the declarative [`SequenceDefinition`]
//! IR, validates structural constraints (unique step names, name format),
//! and compiles definitions into runnable executors. Compilation is where
//! every configuration error surfaces -- a definition that compiles sends
//! no request until `run` is called.

use std::path::Path;

use stepbot_types::error::RuleError;
use stepbot_types::sequence::{SequenceDefinition, StepDefinition};
use thiserror::Error;

use super::executor::SequenceExecutor;
use super::rule::Rule;
use super::step::Step;
use crate::transport::Transport;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or compiling a definition.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// YAML parse failure, including unknown method or rule-kind tags.
    #[error("parse error: {0}")]
    Parse(String),

    /// Structural validation failure.
    #[error("validation error: {0}")]
    Validation(String),

    /// Filesystem I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A rule failed to compile.
    #[error("rule '{rule}' in step '{step}': {source}")]
    Rule {
        step: String,
        rule: String,
        #[source]
        source: RuleError,
    },
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a YAML string into a validated `SequenceDefinition`.
///
/// Runs `validate_definition` after deserialization, so the returned
/// value is guaranteed to be structurally valid.
pub fn parse_sequence_yaml(yaml: &str) -> Result<SequenceDefinition, DefinitionError> {
    let def: SequenceDefinition =
        serde_yaml_ng::from_str(yaml).map_err(|e| DefinitionError::Parse(e.to_string()))?;
    validate_definition(&def)?;
    Ok(def)
}

/// Serialize a `SequenceDefinition` to a YAML string.
pub fn serialize_sequence_yaml(def: &SequenceDefinition) -> Result<String, DefinitionError> {
    serde_yaml_ng::to_string(def).map_err(|e| DefinitionError::Parse(e.to_string()))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate structural constraints on a `SequenceDefinition`.
///
/// Checks:
/// - Name is non-empty and contains only alphanumeric characters and hyphens
/// - At least one step exists
/// - All step names are unique
/// - Step timeouts > 0 when set
pub fn validate_definition(def: &SequenceDefinition) -> Result<(), DefinitionError> {
    if def.name.is_empty() {
        return Err(DefinitionError::Validation(
            "sequence name must not be empty".to_string(),
        ));
    }
    if !def.name.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(DefinitionError::Validation(format!(
            "sequence name '{}' contains invalid characters (only alphanumeric and hyphens allowed)",
            def.name
        )));
    }

    if def.steps.is_empty() {
        return Err(DefinitionError::Validation(
            "sequence must have at least one step".to_string(),
        ));
    }

    let mut seen_names = std::collections::HashSet::new();
    for step in &def.steps {
        if !seen_names.insert(step.name.as_str()) {
            return Err(DefinitionError::Validation(format!(
                "duplicate step name: '{}'",
                step.name
            )));
        }
    }

    for step in &def.steps {
        if step.timeout_secs == Some(0) {
            return Err(DefinitionError::Validation(format!(
                "step '{}': timeout must be > 0",
                step.name
            )));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

/// Compile one step definition into a runnable [`Step`].
///
/// Rule conditions are compiled here (regex included), so every
/// configuration error in the definition surfaces before any request is
/// sent.
pub fn compile_step(def: &StepDefinition) -> Result<Step, DefinitionError> {
    let mut builder = Step::builder(def.method, def.url.clone());

    for (name, value) in &def.headers {
        builder = builder.header(name, value);
    }
    if let Some(body) = &def.body {
        builder = builder.body(body);
    }
    for (name, value) in &def.form_params {
        builder = builder.form_param(name, value);
    }
    for (name, value) in &def.query_params {
        builder = builder.query_param(name, value);
    }
    if let Some(timeout) = def.timeout_secs {
        builder = builder.timeout_secs(timeout);
    }

    for rule_def in &def.success_rules {
        let rule = Rule::from_definition(&rule_def.condition).map_err(|e| DefinitionError::Rule {
            step: def.name.clone(),
            rule: rule_def.name.clone(),
            source: e,
        })?;
        builder = builder.success_rule(rule_def.name.clone(), rule);
    }
    for rule_def in &def.failure_rules {
        let rule = Rule::from_definition(&rule_def.condition).map_err(|e| DefinitionError::Rule {
            step: def.name.clone(),
            rule: rule_def.name.clone(),
            source: e,
        })?;
        builder = builder.failure_rule(rule_def.name.clone(), rule);
    }

    Ok(builder
        .break_on_success(def.break_on_success)
        .break_on_failure(def.break_on_failure)
        .build())
}

impl<T: Transport> SequenceExecutor<T> {
    /// Build an executor from a declarative definition.
    ///
    /// Validates the definition and compiles every step and rule; all
    /// configuration errors surface here.
    pub fn from_definition(
        transport: T,
        def: &SequenceDefinition,
    ) -> Result<Self, DefinitionError> {
        validate_definition(def)?;

        let mut executor = SequenceExecutor::new(transport);
        for step_def in &def.steps {
            let step = compile_step(step_def)?;
            executor = executor.add_step(step_def.name.clone(), step);
        }
        tracing::debug!(
            sequence = def.name.as_str(),
            steps = def.steps.len(),
            "compiled sequence definition"
        );
        Ok(executor)
    }
}

// ---------------------------------------------------------------------------
// Filesystem operations
// ---------------------------------------------------------------------------

/// Load a sequence definition from a YAML file.
pub fn load_sequence_file(path: &Path) -> Result<SequenceDefinition, DefinitionError> {
    let content = std::fs::read_to_string(path)?;
    parse_sequence_yaml(&content)
}

/// Save a sequence definition to a YAML file.
///
/// Creates parent directories if they don't exist.
pub fn save_sequence_file(path: &Path, def: &SequenceDefinition) -> Result<(), DefinitionError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let yaml = serialize_sequence_yaml(def)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
