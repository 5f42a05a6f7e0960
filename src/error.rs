use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::account::auth::AuthError;
use crate::client::DirectoryError;
use crate::storage::StoreError;

/// Failures of the account lifecycle operations.
///
/// The `Display` text is the message sent back to HTTP callers.
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),
    #[error("Username already exists")]
    Conflict,
    #[error("User does not exist")]
    NotFound,
    #[error("Incorrect password")]
    InvalidCredentials,
    #[error("User not verified. Please check your email for the verification link.")]
    Unverified,
    #[error("Invalid verification token")]
    InvalidToken,
    /// The remote directory answered with a failure status.
    #[error("{}", remote_message(.body))]
    RemoteRejected { status: u16, body: String },
    /// Transport or parse failure talking to the remote directory.
    #[error("Chat service unavailable: {0}")]
    RemoteError(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

fn remote_message(body: &str) -> &str {
    if body.trim().is_empty() {
        "Chat service rejected the request"
    } else {
        body
    }
}

impl AccountError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AccountError::Validation(_) => StatusCode::BAD_REQUEST,
            AccountError::Conflict => StatusCode::BAD_REQUEST,
            AccountError::NotFound => StatusCode::NOT_FOUND,
            AccountError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AccountError::Unverified => StatusCode::UNAUTHORIZED,
            AccountError::InvalidToken => StatusCode::BAD_REQUEST,
            AccountError::RemoteRejected { .. } => StatusCode::BAD_REQUEST,
            AccountError::RemoteError(_) => StatusCode::BAD_GATEWAY,
            AccountError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AccountError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => AccountError::Conflict,
            other => AccountError::Storage(other.to_string()),
        }
    }
}

impl From<DirectoryError> for AccountError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Rejected { status, body } => AccountError::RemoteRejected { status, body },
            other => AccountError::RemoteError(other.to_string()),
        }
    }
}

impl From<AuthError> for AccountError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidSecret => AccountError::InvalidCredentials,
            other => AccountError::Internal(other.to_string()),
        }
    }
}
