//! Sequence engine: conditions, rules, steps, and the sequential executor.
//!
//! - `condition` -- compiled rule conditions and their evaluation
//! - `rule` -- named conditions that convert a match into an outcome
//! - `step` -- one configured request plus its rules, and how it runs
//! - `executor` -- ordered execution with halt-on-break and result lookup
//! - `definition` -- YAML parsing, validation, filesystem load/save

pub mod condition;
pub mod definition;
pub mod executor;
pub mod rule;
pub mod step;

pub use condition::Condition;
pub use definition::DefinitionError;
pub use executor::{ExecutorError, LookupError, RunReport, SequenceExecutor};
pub use rule::{Rule, RuleRole};
pub use step::{Step, StepBuilder, StepRunError};
