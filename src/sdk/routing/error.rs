use serde::Deserialize;
use thiserror::Error;

// Error body the directions endpoint returns alongside a non-OK status
#[derive(Deserialize, Debug)]
pub struct ApiErrorPayload {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("The server failed to respond.")]
    Timeout,

    #[error("API Error ({status}): {message}")]
    Api { status: String, message: String },

    // Non-2xx response whose body is not a directions payload
    #[error("HTTP Error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Underlying request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Directions response is missing a required field: {0}")]
    MissingField(String),
}

impl RoutingError {
    /// Text shown to the user when a search fails.
    pub fn user_message(&self) -> String {
        match self {
            RoutingError::Timeout => "The server failed to respond.".to_string(),
            RoutingError::Api { message, .. } => message.clone(),
            RoutingError::Http { status, body } if body.trim().is_empty() => {
                format!("HTTP Error {}", status)
            }
            RoutingError::Http { body, .. } => body.clone(),
            RoutingError::Transport(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for RoutingError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RoutingError::Timeout
        } else {
            RoutingError::Transport(e)
        }
    }
}
