use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::camera::pipeline::PipelineError;

/// The three failure kinds a snapshot caller needs to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Client misconfiguration; retrying will not help.
    Config,
    /// The capture exceeded its time bound.
    Timeout,
    /// The capture ran but produced nothing usable.
    Acquire,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Acquire(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl SnapshotError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Acquire(_) | Self::Pipeline(_) => ErrorKind::Acquire,
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<SnapshotError> for AppError {
    fn from(value: SnapshotError) -> Self {
        // Underlying messages may embed the input URL; keep responses generic.
        match value.kind() {
            ErrorKind::Config => Self::new(StatusCode::BAD_REQUEST, "input_url is not configured"),
            ErrorKind::Timeout => Self::new(StatusCode::GATEWAY_TIMEOUT, "snapshot timed out"),
            ErrorKind::Acquire => Self::new(StatusCode::BAD_GATEWAY, "could not capture snapshot"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}
