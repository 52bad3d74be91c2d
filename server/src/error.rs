use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use registry::RegistryError;
use thiserror::Error;

use crate::allocator::AllocationFailed;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Unknown membership category: {0}")]
    UnknownCategory(String),

    #[error("Serial allocation failed: {0}")]
    AllocationFailed(#[from] AllocationFailed),

    #[error("No member under that identifier")]
    MemberNotFound,

    #[error("Internal error: {0}")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl From<RegistryError> for AppError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::UnknownCategory(name) => AppError::UnknownCategory(name),
            other => AppError::InternalError(Box::new(other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MalformedPayload { .. } => StatusCode::BAD_REQUEST,
            AppError::UnknownCategory { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::AllocationFailed { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::MemberNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}
