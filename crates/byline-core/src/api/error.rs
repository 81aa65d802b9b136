//! Structured errors for article API calls.

use std::fmt;

use serde_json::Value;

/// Categories of API errors for consistent error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// HTTP status error (4xx, 5xx)
    HttpStatus,
    /// Connection timeout or request timeout
    Timeout,
    /// Failed to parse the response body
    Parse,
    /// Connection/transport failure
    Network,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::HttpStatus => write!(f, "http_status"),
            ApiErrorKind::Timeout => write!(f, "timeout"),
            ApiErrorKind::Parse => write!(f, "parse"),
            ApiErrorKind::Network => write!(f, "network"),
        }
    }
}

/// Structured error from the article API with kind and details.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// HTTP status code, when the server answered at all
    pub status: Option<u16>,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error without a status code.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an HTTP status error.
    ///
    /// The server's error body is kept in `details`; when it follows the
    /// API's `{"errors": {...}}` convention the first message is folded
    /// into the summary.
    pub fn http_status(status: u16, body: &str) -> Self {
        let message = format!("HTTP {status}");
        let details = if body.is_empty() {
            None
        } else {
            if let Some(msg) = extract_error_message(body) {
                return Self {
                    kind: ApiErrorKind::HttpStatus,
                    status: Some(status),
                    message: format!("HTTP {status}: {msg}"),
                    details: Some(body.to_string()),
                };
            }
            Some(body.to_string())
        };
        Self {
            kind: ApiErrorKind::HttpStatus,
            status: Some(status),
            message,
            details,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Timeout, message)
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Parse, message)
    }

    /// Creates a transport error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    /// Returns true for an HTTP 401, the trigger for forced logout.
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

/// Extracts a readable message from the API's error body, if it matches the
/// `{"errors": {"<field>": ["<message>", ...]}}` shape.
fn extract_error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    let errors = json.get("errors")?.as_object()?;
    let (field, messages) = errors.iter().next()?;
    let first = messages.as_array()?.first()?.as_str()?;
    Some(format!("{field} {first}"))
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(err.to_string())
        } else if err.is_decode() {
            Self::parse(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

/// Result type for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
