// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::rules::RuleViolation;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Rule(#[from] RuleViolation),

    #[error("Invalid or missing authentication token")]
    InvalidToken,

    // Missing role only. Other people's orders and listings answer as not found.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Order {0} not found")]
    OrderNotFound(Uuid),

    #[error("Listing {0} not found")]
    ListingNotFound(Uuid),

    // A conditional status update matched no row: someone else moved the order first.
    #[error("Order {0} was changed by another request")]
    StaleOrder(Uuid),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Rule(rule) => match rule {
                RuleViolation::InvalidTransition { .. } => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            },
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::OrderNotFound(_) | AppError::ListingNotFound(_) => StatusCode::NOT_FOUND,
            AppError::StaleOrder(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::JwtError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            // Field-level details so the form can highlight what is wrong.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                })
            }
            e if status.is_server_error() => {
                tracing::error!(error = ?e, "request failed with internal error");
                json!({ "error": "An unexpected error occurred." })
            }
            e => {
                if status == StatusCode::CONFLICT {
                    tracing::warn!(error = %e, "request rejected");
                }
                json!({ "error": e.to_string() })
            }
        };

        (status, Json(body)).into_response()
    }
}
