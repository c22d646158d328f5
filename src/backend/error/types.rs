/**
 * Backend Error Types
 *
 * `BackendError` wraps the domain errors (`OrderingError`, `SharedError`,
 * `StoreError`) and adds the request-level failures handlers raise
 * themselves: authentication, authorization and missing entities.
 */
use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::store::StoreError;
use crate::shared::{OrderingError, SharedError};

/// Everything a board handler can fail with
#[derive(Debug, Error)]
pub enum BackendError {
    /// Failure raised by the handler itself, with the status to answer
    #[error("{message}")]
    Request {
        status: StatusCode,
        message: String,
    },

    /// Position engine failure
    #[error(transparent)]
    Ordering(#[from] OrderingError),

    /// Request body failed validation
    #[error(transparent)]
    Payload(#[from] SharedError),

    /// Storage failure outside the position engine
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Could not encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl BackendError {
    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Request {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, format!("{} not found", what))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, message)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Request { status, .. } => *status,
            Self::Ordering(err) => match err {
                OrderingError::InvalidRange { .. } => StatusCode::BAD_REQUEST,
                OrderingError::NotFound { .. } => StatusCode::NOT_FOUND,
                OrderingError::StaleState { .. } => StatusCode::CONFLICT,
                OrderingError::ForeignContainer { .. } => StatusCode::BAD_REQUEST,
                OrderingError::StorageUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::Payload(SharedError::Invalid { .. }) => StatusCode::BAD_REQUEST,
            Self::Payload(SharedError::Malformed { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(err) => match err {
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::Database(_) | StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text for the `error` field of the response body
    pub fn message(&self) -> String {
        match self {
            Self::Request { message, .. } => message.clone(),
            Self::Ordering(OrderingError::ForeignContainer { message, .. }) => message.clone(),
            Self::Payload(SharedError::Invalid { message, .. }) => message.clone(),
            Self::Store(StoreError::Database(_)) => "Storage unavailable".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the client should re-fetch the affected containers
    pub fn needs_resync(&self) -> bool {
        match self {
            Self::Ordering(OrderingError::ForeignContainer { .. }) => false,
            Self::Ordering(_) => true,
            Self::Store(StoreError::Database(_) | StoreError::Unavailable(_)) => true,
            _ => false,
        }
    }
}
