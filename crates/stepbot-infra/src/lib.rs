//! Infrastructure layer for stepbot.
//!
//! Contains the implementation of the `Transport` port defined in
//! `stepbot-core`: a `reqwest`-backed HTTP client with the session
//! semantics steps expect (shared cookie jar, redirects not followed,
//! fully buffered bodies).

pub mod transport;

pub use transport::HttpTransport;
