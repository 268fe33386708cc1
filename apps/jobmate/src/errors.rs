use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::i18n::{translate, Language, MessageKey};

/// Client-level error type returned by every backend call.
///
/// Callers never show `Display` output to the user directly; they go through
/// [`ClientError::user_message`], which classifies the failure.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally, no request was sent.
    #[error("Validation error: {0:?}")]
    Validation(MessageKey),

    /// Backend answered with a recognisable error body.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected status {status}")]
    UnexpectedStatus { status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The configured base URL cannot carry a resource path.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Single user-visible string for this failure: validation messages are
    /// translated, backend messages are shown verbatim, anything else maps to
    /// the generic fallback.
    pub fn user_message(&self, lang: Language) -> String {
        match self {
            ClientError::Validation(key) => translate(lang, *key).to_string(),
            ClientError::Api { message, .. } => message.clone(),
            ClientError::UnexpectedStatus { status } => {
                tracing::warn!("Unexpected backend status {status}");
                translate(lang, MessageKey::GenericError).to_string()
            }
            ClientError::Http(e) => {
                tracing::error!("HTTP error: {e}");
                translate(lang, MessageKey::GenericError).to_string()
            }
            ClientError::Parse(e) => {
                tracing::error!("Response parse error: {e}");
                translate(lang, MessageKey::GenericError).to_string()
            }
            ClientError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                translate(lang, MessageKey::GenericError).to_string()
            }
            ClientError::InvalidUrl(url) => {
                tracing::error!("Invalid request URL: {url}");
                translate(lang, MessageKey::GenericError).to_string()
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ClientError::Api { status: 404, .. } | ClientError::UnexpectedStatus { status: 404 }
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Detail { detail: Value },
    Nested { error: NestedError },
}

#[derive(Debug, Deserialize)]
struct NestedError {
    message: String,
}

/// Extracts the human-readable message from a backend error body.
///
/// Recognised shapes: `{"detail": "..."}`, `{"detail": {"message": "..."}}`
/// and `{"error": {"message": "..."}}`.
pub fn extract_error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let message = match parsed {
        ErrorBody::Detail { detail } => match detail {
            Value::String(s) => s,
            Value::Object(map) => map.get("message")?.as_str()?.to_string(),
            _ => return None,
        },
        ErrorBody::Nested { error } => error.message,
    };
    let message = message.trim().to_string();
    (!message.is_empty()).then_some(message)
}
