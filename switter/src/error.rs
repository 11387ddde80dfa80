use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use switter_graph::StorageError;
use thiserror::Error;

use crate::session::SessionError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("Authentication failed")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    title: &'static str,
    status: u16,
    message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Server-side details stay in the log
        let message = match &self {
            AppError::Database(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                "Something went wrong".to_string()
            }
            AppError::Unauthorized => "Invalid username or password".to_string(),
            AppError::AlreadyExists(msg) | AppError::BadRequest(msg) => msg.clone(),
        };

        let page = ErrorTemplate {
            title: "Error",
            status: status.as_u16(),
            message,
        };

        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "failed to render error page");
                (status, page.message).into_response()
            }
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UniqueViolation { value, .. } => {
                AppError::AlreadyExists(format!("'{}' is already taken", value))
            }
            other => AppError::Database(other.to_string()),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Signing(msg) => AppError::Internal(msg),
            _ => AppError::Unauthorized,
        }
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::Internal(format!("Template rendering failed: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
