//! reqwest-backed transport adapter.
//!
//! [`HttpTransport`] implements the [`Transport`] trait from
//! `stepbot-core`. Client policy follows the step contract:
//! - cookies persist in a shared jar for the lifetime of the transport,
//!   so session state set by one step is sent by the next;
//! - redirects are not followed -- rules must see the 3xx itself;
//! - TLS certificate verification is disabled. This is a deliberate
//!   trust trade-off for scripted targets with broken chains; do not
//!   point this at services where transport integrity matters.

use std::time::Duration;

use stepbot_core::transport::Transport;
use stepbot_types::error::TransportError;
use stepbot_types::http::{Method, RequestSpec, Response};

/// Default per-request timeout applied when a step sets none.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP transport backed by a `reqwest::Client`.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the step-contract client policy.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(true)
            .user_agent(concat!("stepbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one with preloaded cookies. The
    /// caller is responsible for the client's redirect and TLS policy.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Head => reqwest::Method::HEAD,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Connect => reqwest::Method::CONNECT,
        Method::Options => reqwest::Method::OPTIONS,
        Method::Trace => reqwest::Method::TRACE,
        Method::Patch => reqwest::Method::PATCH,
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &RequestSpec) -> Result<Response, TransportError> {
        let mut req = self
            .client
            .request(to_reqwest_method(request.method), &request.url);

        if !request.query_params.is_empty() {
            req = req.query(&request.query_params);
        }
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }
        if !request.form_params.is_empty() {
            // Form encoding supplies its own body, overriding a raw one.
            req = req.form(&request.form_params);
        }
        let timeout = request.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        req = req.timeout(Duration::from_secs(timeout));

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    url: request.url.clone(),
                }
            } else {
                TransportError::Send {
                    url: request.url.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    v.to_str().unwrap_or("<binary>").to_string(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body {
                url: request.url.clone(),
                reason: e.to_string(),
            })?
            .to_vec();

        tracing::debug!(
            url = request.url.as_str(),
            status,
            body_len = body.len(),
            "request completed"
        );

        Ok(Response::new(status, headers, body))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
