//! Error types for the deploys control plane

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use deploys_protocol::{ApiError, Envelope, ErrorCode};
use thiserror::Error;
use tracing::error;

use crate::validate::ValidationError;

/// Main error type for the control plane and its client
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("api: invalid request: {0}")]
    InvalidRequest(String),

    #[error("api: method not found: {0}")]
    MethodNotFound(String),

    /// The resource has an outstanding action or is in a state that forbids the request
    #[error("{0}")]
    Conflict(ErrorCode),

    #[error("{0}")]
    NotFound(ErrorCode),

    /// Error returned by a remote control plane that has no local counterpart
    #[error("{}", .0.message)]
    Remote(ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Shutdown error: {0}")]
    Shutdown(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for ControlError {
    fn from(err: anyhow::Error) -> Self {
        ControlError::Internal(err.to_string())
    }
}

impl ControlError {
    /// Build the error matching a stable code
    pub fn from_code(code: ErrorCode) -> Self {
        match code.http_status() {
            404 => ControlError::NotFound(code),
            409 => ControlError::Conflict(code),
            _ => ControlError::Remote(ApiError::new(code)),
        }
    }

    /// Map an error received over the wire back onto local variants
    pub fn from_api(err: ApiError) -> Self {
        match err.code {
            ErrorCode::Validation => ControlError::Validation(ValidationError { items: err.items }),
            ErrorCode::InvalidRequest
            | ErrorCode::MethodNotFound
            | ErrorCode::Unauthorized
            | ErrorCode::Forbidden
            | ErrorCode::Internal => ControlError::Remote(err),
            code => ControlError::from_code(code),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ControlError::Validation(_) => ErrorCode::Validation,
            ControlError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            ControlError::MethodNotFound(_) => ErrorCode::MethodNotFound,
            ControlError::Conflict(code) | ControlError::NotFound(code) => *code,
            ControlError::Remote(err) => err.code,
            _ => ErrorCode::Internal,
        }
    }

    pub fn to_api_error(&self) -> ApiError {
        match self {
            ControlError::Validation(err) => ApiError {
                code: ErrorCode::Validation,
                message: ErrorCode::Validation.message().to_string(),
                items: err.items.clone(),
            },
            ControlError::InvalidRequest(_) | ControlError::MethodNotFound(_) => ApiError {
                code: self.code(),
                message: self.to_string(),
                items: Vec::new(),
            },
            ControlError::Remote(err) => err.clone(),
            _ => ApiError::new(self.code()),
        }
    }
}

impl IntoResponse for ControlError {
    fn into_response(self) -> Response {
        let code = self.code();
        if code == ErrorCode::Internal {
            error!("Request failed: {}", self);
        }

        let status =
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Envelope<()> = Envelope::err(self.to_api_error());
        (status, Json(body)).into_response()
    }
}
