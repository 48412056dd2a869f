//! API errors and error-body normalization

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{Map, Value};

/// Message used when an error response carries no JSON
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// One field of a validation error response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub messages: Vec<String>,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.messages.join(", "))
    }
}

/// Decoded body of a non-2xx response.
///
/// Kept structured so callers can inspect field errors; rendered to text only
/// through [`ErrorBody::message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    /// `{"error": "..."}`
    SingleMessage(String),
    /// `{"field": ["msg", ...], ...}` in server order
    FieldErrors(Vec<FieldError>),
    /// Body was not JSON
    Unknown,
    /// JSON without anything worth showing
    Empty,
}

impl ErrorBody {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => Self::from_value(&value),
            Err(_) => Self::Unknown,
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::Empty;
        };

        if let Some(Value::String(error)) = object.get("error") {
            if !error.is_empty() {
                return Self::SingleMessage(error.clone());
            }
        }

        let fields = field_errors(object);
        if fields.is_empty() {
            Self::Empty
        } else {
            Self::FieldErrors(fields)
        }
    }

    /// Human-readable message for a response with the given status code
    pub fn message(&self, status: u16) -> String {
        match self {
            Self::SingleMessage(message) => message.clone(),
            Self::FieldErrors(fields) => fields
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Unknown => UNKNOWN_ERROR.to_string(),
            Self::Empty => format!("HTTP error! status: {}", status),
        }
    }
}

fn field_errors(object: &Map<String, Value>) -> Vec<FieldError> {
    object
        .iter()
        .filter_map(|(field, value)| {
            let messages = messages_of(value);
            if messages.is_empty() {
                None
            } else {
                Some(FieldError {
                    field: field.clone(),
                    messages,
                })
            }
        })
        .collect()
}

fn messages_of(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) if s.is_empty() => Vec::new(),
        Value::String(s) => vec![s.clone()],
        Value::Number(n) => vec![n.to_string()],
        Value::Bool(b) => vec![b.to_string()],
        Value::Array(items) => items.iter().flat_map(messages_of).collect(),
        Value::Null | Value::Object(_) => Vec::new(),
    }
}

/// API errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request timeout after {0:?} - is the WheelTracker server running?")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("{}", http_message(.status, .body))]
    Http { status: StatusCode, body: ErrorBody },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

fn http_message(status: &StatusCode, body: &ErrorBody) -> String {
    body.message(status.as_u16())
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Structured body of an HTTP error, if any
    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}
