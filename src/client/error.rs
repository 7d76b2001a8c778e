// src/client/error.rs

use thiserror::Error;

use crate::models::rules::RuleViolation;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer. `message` is the server's `error`/`message` field,
    /// the raw body, or the status reason, in that order.
    #[error("{status}: {message}")]
    Status { status: u16, message: String },

    /// 401/403 outside a dev host.
    #[error("Login required")]
    LoginRequired { redirect: String },

    /// Rejected locally; no request was sent.
    #[error(transparent)]
    Rule(#[from] RuleViolation),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// What the UI should do with a failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Redirect(String),
    /// Destructive toast.
    Toast { title: String, description: String },
}

impl ClientError {
    pub fn disposition(&self) -> Disposition {
        match self {
            ClientError::LoginRequired { redirect } => Disposition::Redirect(redirect.clone()),
            ClientError::Rule(violation) => Disposition::Toast {
                title: violation.title().to_string(),
                description: violation.to_string(),
            },
            ClientError::Validation(_) => Disposition::Toast {
                title: "Invalid input".to_string(),
                description: self.to_string(),
            },
            _ => Disposition::Toast {
                title: "Error".to_string(),
                description: self.to_string(),
            },
        }
    }
}
