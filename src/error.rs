use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

pub const AUTH_FAILED_MESSAGE: &str = "Invalid username or password";
pub const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug, ThisError)]
pub enum ChatGateError {
    #[error("{0}")]
    Validation(String),

    #[error("Username already exists")]
    DuplicateUser,

    /// Deliberately identical for unknown users and wrong passwords.
    #[error("Invalid username or password")]
    Auth,

    #[error("Invalid action or missing parameters")]
    InvalidAction,

    #[error("Upstream error {status}: {message}")]
    Upstream { status: StatusCode, message: String },

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Actor error: {0}")]
    Actor(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Non-2xx answer from this service's own HTTP API, seen by the client side.
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    #[error("Chat system not loaded yet. Please try again.")]
    WidgetNotReady,

    #[error("Chat widget error: {0}")]
    Widget(String),
}

impl ChatGateError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::DuplicateUser | Self::InvalidAction => {
                StatusCode::BAD_REQUEST
            }
            Self::Auth => StatusCode::UNAUTHORIZED,
            Self::Upstream { status, .. } | Self::Api { status, .. } => *status,
            Self::WidgetNotReady => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_)
            | Self::Hashing(_)
            | Self::Reqwest(_)
            | Self::UrlParse(_)
            | Self::Json(_)
            | Self::Config(_)
            | Self::Actor(_)
            | Self::Internal(_)
            | Self::Widget(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the visitor. Internal detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(_)
            | Self::DuplicateUser
            | Self::Auth
            | Self::InvalidAction
            | Self::WidgetNotReady => self.to_string(),
            Self::Upstream { message, .. } | Self::Api { message, .. } => message.clone(),
            _ => INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for ChatGateError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() && !matches!(self, Self::Upstream { .. }) {
            error!(error = %self, "request failed");
        }
        let body = ApiErrorBody {
            message: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Error body returned by every endpoint: `{"message": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: ChatGateError) -> (StatusCode, String) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn duplicate_user_maps_to_400() {
        let (status, body) = body_of(ChatGateError::DuplicateUser).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"message":"Username already exists"}"#);
    }

    #[tokio::test]
    async fn upstream_keeps_status_and_message() {
        let (status, body) = body_of(ChatGateError::Upstream {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "maintenance".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, r#"{"message":"maintenance"}"#);
    }

    #[tokio::test]
    async fn internal_errors_hide_detail() {
        let (status, body) =
            body_of(ChatGateError::Database(SqlxError::PoolTimedOut)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"message":"Internal server error"}"#);
    }

    #[test]
    fn auth_message_is_generic() {
        assert_eq!(ChatGateError::Auth.public_message(), AUTH_FAILED_MESSAGE);
    }
}
