//! Handler errors and their HTTP rendering.
//!
//! 401 answers carry a plain-text body; every other failure is an
//! `Envelope` with a single error entry.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;

use crate::envelope::Envelope;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Barcode {0} is already in use")]
    DuplicateBarcode(String),

    #[error("Email {0} is already registered")]
    DuplicateEmail(String),

    #[error("Invalid credentials for {0}")]
    InvalidCredentials(String),

    #[error("Product {0} not found")]
    ProductNotFound(Uuid),

    #[error("{0}")]
    Unauthorized(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::DuplicateBarcode(_)
            | ApiError::DuplicateEmail(_)
            | ApiError::InvalidCredentials(_) => StatusCode::BAD_REQUEST,
            ApiError::ProductNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Unauthorized(message) => (status, message).into_response(),
            other => (status, Json(Envelope::<()>::failure(other.to_string()))).into_response(),
        }
    }
}
