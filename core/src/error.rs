//! Error types for the catalog API client.
//!
//! # Design
//! Runtime failures of a dispatched call never surface as `Err`; they are
//! folded into the `ApiResponse` envelope, including calls that are
//! malformed (see `Fault`). The one exception is a method name the
//! dispatcher does not know, which is `DispatchError`. `TransportError` and
//! `StoreError` belong to the two external collaborators.

use thiserror::Error;

use crate::http::HttpMethod;

/// The caller named a method the dispatcher cannot express. Never produced
/// by the network.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("HTTP method {0} is not supported")]
    UnsupportedMethod(String),
}

/// The transport could not complete the round-trip.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors from the token cache backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Anything that interrupts a call after it has been accepted. Rendered
/// into the envelope as `"Unhandled - {fault}"`.
#[derive(Debug, Error)]
pub(crate) enum Fault {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Encode(serde_json::Error),

    #[error("{0}")]
    Decode(serde_json::Error),

    #[error("request URI must not be empty")]
    EmptyUri,

    #[error("{0} requires a request body")]
    MissingBody(HttpMethod),

    #[error("{0} takes a JSON body; use UPLOAD for binary content")]
    BinaryBody(HttpMethod),

    #[error("UPLOAD takes pre-built binary content, not a JSON value")]
    JsonBody,
}

/// Errors returned by `AccountService`.
#[derive(Debug, Error)]
pub enum AccountError {
    /// The server refused the request; carries the envelope's rendered
    /// error list.
    #[error("{0}")]
    Rejected(String),

    #[error("server accepted the login but returned no session")]
    MissingSession,

    #[error(transparent)]
    Store(#[from] StoreError),
}
