// Remote chat directory client
pub mod chat_engine;

pub use chat_engine::ChatEngineClient;

use crate::account::{RemoteId, SignUp};
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("remote returned status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Decode(String),
}

/// The user directory of the hosted chat provider.
///
/// Each call is a single outbound request. Nothing is retried.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Create a user. All sign-up fields are sent, the secret included.
    async fn create_user(&self, user: &SignUp) -> Result<Value, DirectoryError>;

    /// Fetch the profile of the user authenticating with `username`/`secret`.
    async fn me(&self, username: &str, secret: &str) -> Result<Value, DirectoryError>;

    /// Every user of the project.
    async fn list_users(&self) -> Result<Vec<Value>, DirectoryError>;

    /// Delete by the remote's own identifier. Only a 200 counts as success.
    async fn delete_user(&self, id: RemoteId) -> Result<(), DirectoryError>;
}
