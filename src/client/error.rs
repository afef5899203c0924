use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Failure talking to the Tower API
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication failed ({status}): {message}")]
    Auth { status: StatusCode, message: String },

    #[error("Server error ({status}): {message}")]
    Server { status: StatusCode, message: String },

    #[error("Expected one credential type named {name:?} of kind {kind}, found {count}")]
    MultipleResults {
        name: String,
        kind: String,
        count: usize,
    },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RemoteError {
    /// Map a non-success HTTP status and its body onto the error taxonomy
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = error_message(body);
        match status {
            StatusCode::BAD_REQUEST => RemoteError::BadRequest(message),
            StatusCode::NOT_FOUND => RemoteError::NotFound(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                RemoteError::Auth { status, message }
            }
            _ => RemoteError::Server { status, message },
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else {
            RemoteError::Connection(err.to_string())
        }
    }
}

/// Tower reports errors either as `{"detail": "..."}` or as per-field lists
/// (`{"name": ["This field is required."]}`). Anything else is passed through.
fn error_message(body: &str) -> String {
    let body = body.trim();
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => {
            if let Some(Value::String(detail)) = map.get("detail") {
                return detail.clone();
            }
            let parts: Vec<String> = map
                .iter()
                .map(|(field, value)| match value {
                    Value::Array(items) => {
                        let msgs: Vec<String> = items
                            .iter()
                            .map(|i| i.as_str().map(str::to_string).unwrap_or_else(|| i.to_string()))
                            .collect();
                        format!("{}: {}", field, msgs.join(" "))
                    }
                    Value::String(s) => format!("{}: {}", field, s),
                    other => format!("{}: {}", field, other),
                })
                .collect();
            if parts.is_empty() {
                body.to_string()
            } else {
                parts.join("; ")
            }
        }
        _ if body.is_empty() => "empty response".to_string(),
        _ => body.to_string(),
    }
}
