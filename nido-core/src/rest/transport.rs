//! REST Transport Trait
//!
//! Platform-agnostic abstraction for HTTP communication with the Nido
//! backend API.

use serde_json::Value;
use thiserror::Error;

/// Result type for REST transport operations.
pub type RestResult<T> = Result<T, RestError>;

/// Transport-level REST errors.
///
/// These cover failures to reach the server at all. HTTP status handling
/// (401, other non-2xx) belongs to the session layer, which sees the
/// status on the returned [`ApiResponse`].
#[derive(Error, Debug)]
pub enum RestError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// HTTP method subset used by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Configuration for REST transports.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Base URL of the backend API, without trailing slash.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for RestConfig {
    fn default() -> Self {
        RestConfig {
            base_url: String::new(),
            timeout_ms: 15_000,
        }
    }
}

/// A request to the backend API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, starting with `/`.
    pub path: String,
    /// Bearer credential, attached as an `Authorization` header when present.
    pub bearer: Option<String>,
    /// JSON body for write methods.
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: &str) -> Self {
        ApiRequest {
            method,
            path: path.to_string(),
            bearer: None,
            body: None,
        }
    }

    pub fn with_bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A response from the backend API.
///
/// The status is carried as data: a 401 is a valid response at this layer.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body, or `Value::Null` when the body was empty or not JSON.
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        ApiResponse { status, body }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Extracts the server-provided `message` field, if any.
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }
}

/// REST transport trait.
///
/// This trait abstracts the HTTP mechanism so the core can be exercised
/// with mocks and embedded behind whatever client a UI shell already
/// carries. The interface is synchronous; implementations may run an async
/// client internally but expose a blocking call here.
pub trait RestTransport: Send {
    /// Executes a request and returns the response.
    ///
    /// Returns an error only when the server could not be reached or the
    /// response was unreadable; HTTP error statuses are returned as data.
    fn execute(&self, request: &ApiRequest) -> RestResult<ApiResponse>;
}
