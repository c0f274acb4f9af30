//! HTTP boundary types: methods, request specs, and buffered responses.
//!
//! These are the values exchanged across the transport boundary. The
//! engine never touches a concrete HTTP client; it builds a
//! [`RequestSpec`], hands it to the transport, and gets a [`Response`]
//! back with the body fully buffered.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StepConfigError;

// ---------------------------------------------------------------------------
// Method
// ---------------------------------------------------------------------------

/// The standard HTTP request methods a step may use.
///
/// Input is case-insensitive ("get", "Get", and "GET" all parse); the
/// canonical rendering is upper-case. Anything outside this set is
/// rejected at configuration time with
/// [`StepConfigError::InvalidMethod`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Method {
    Get,
    Post,
    Head,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
}

impl Method {
    /// The canonical upper-case name of this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Head => "HEAD",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Connect => "CONNECT",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Patch => "PATCH",
        }
    }
}

impl FromStr for Method {
    type Err = StepConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "HEAD" => Ok(Method::Head),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "CONNECT" => Ok(Method::Connect),
            "OPTIONS" => Ok(Method::Options),
            "TRACE" => Ok(Method::Trace),
            "PATCH" => Ok(Method::Patch),
            _ => Err(StepConfigError::InvalidMethod(s.to_string())),
        }
    }
}

impl TryFrom<String> for Method {
    type Error = StepConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Method> for String {
    fn from(method: Method) -> String {
        method.as_str().to_string()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RequestSpec
// ---------------------------------------------------------------------------

/// Everything the transport needs to send one step's request.
///
/// Redirect and TLS policy are fixed by the transport implementation
/// (redirects disabled, certificate verification disabled), not carried
/// per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    /// Raw request body. Ignored by the transport when form params are
    /// present, since form encoding produces its own body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub form_params: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub query_params: HashMap<String, String>,
    /// Upper bound on the whole send, in seconds. None means the
    /// transport's default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// A fully buffered HTTP response as rule evaluation sees it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    /// Numeric status code. 0 marks a synthetic response that never came
    /// off the wire.
    pub status: u16,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Raw body bytes, fully buffered (no streaming sink).
    #[serde(default)]
    pub body: Vec<u8>,
}

impl Response {
    /// Build a response from parts.
    pub fn new(status: u16, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// A synthetic empty response, for evaluating rules outside a live
    /// request.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The body decoded as UTF-8 text, lossily. Body-matching rules
    /// evaluate against this view.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Header lookup, case-insensitive on the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_is_case_insensitive() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("Get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("PATCH".parse::<Method>().unwrap(), Method::Patch);
    }

    #[test]
    fn test_method_normalizes_to_upper_case() {
        let method: Method = "get".parse().unwrap();
        assert_eq!(method.as_str(), "GET");
        assert_eq!(method.to_string(), "GET");
    }

    #[test]
    fn test_method_rejects_unknown_verb() {
        let err = "foo".parse::<Method>().unwrap_err();
        assert!(err.to_string().contains("foo"), "got: {err}");
    }

    #[test]
    fn test_method_serde_accepts_any_case() {
        let method: Method = serde_json::from_str(r#""delete""#).unwrap();
        assert_eq!(method, Method::Delete);

        let rendered = serde_json::to_string(&method).unwrap();
        assert_eq!(rendered, r#""DELETE""#);
    }

    #[test]
    fn test_method_serde_rejects_unknown_verb() {
        let result: Result<Method, _> = serde_json::from_str(r#""brew""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_response_text_is_lossy() {
        let response = Response::new(200, HashMap::new(), vec![0x68, 0x69, 0xFF]);
        assert_eq!(response.text(), "hi\u{FFFD}");
    }

    #[test]
    fn test_response_header_lookup_ignores_case() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "text/html".to_string());
        let response = Response::new(200, headers, Vec::new());
        assert_eq!(response.header("content-type"), Some("text/html"));
        assert_eq!(response.header("x-missing"), None);
    }

    #[test]
    fn test_empty_response_is_synthetic() {
        let response = Response::empty();
        assert_eq!(response.status, 0);
        assert!(response.body.is_empty());
    }
}
