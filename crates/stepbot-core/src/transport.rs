//! Transport port: the HTTP-sending capability a step consumes.

use stepbot_types::error::TransportError;
use stepbot_types::http::{RequestSpec, Response};

/// Sends one request and returns the fully buffered response.
///
/// Uses RPITIT (return-position `impl Trait` in traits) for the async
/// method, consistent with the project's Rust 2024 edition approach.
///
/// The executor owns one transport per sequence and passes it by
/// reference into every step, so connection and cookie state accumulate
/// across steps. Implementations must not be driven by two runs
/// concurrently; cookie-jar state is mutable and ordered.
pub trait Transport: Send + Sync {
    /// Send a request. Transport failures (network error, timeout) are
    /// returned as-is; the engine never retries or rewrites them.
    fn send(
        &self,
        request: &RequestSpec,
    ) -> impl std::future::Future<Output = Result<Response, TransportError>> + Send;
}
