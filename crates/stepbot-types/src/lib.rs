//! Shared domain types for stepbot.
//!
//! This crate contains the types used across the stepbot workspace:
//! HTTP boundary values (method, request, response), rule conditions,
//! step outcomes, the declarative sequence IR, and their error types.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod error;
pub mod http;
pub mod outcome;
pub mod rule;
pub mod sequence;
