//! Account lifecycle: signup, login, email verification, listing and deletion
//!
//! The local store and the remote directory are not updated atomically.
//! When the local save fails after the remote user was created, the remote
//! user is deleted again (best effort). A crash between the two writes can
//! still leave an orphan remote user.

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};

use super::auth::{generate_verification_token, hash_secret, verify_secret};
use super::types::{Account, RemoteId, SignUp};
use crate::client::Directory;
use crate::error::AccountError;
use crate::mail::Notifier;
use crate::storage::AccountStore;

pub struct AccountService {
    store: Arc<AccountStore>,
    directory: Arc<dyn Directory>,
    notifier: Arc<dyn Notifier>,
}

impl AccountService {
    pub fn new(
        store: Arc<AccountStore>,
        directory: Arc<dyn Directory>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            directory,
            notifier,
        }
    }

    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    /// Register a user locally and on the remote directory, then mail the
    /// verification link.
    pub async fn sign_up(&self, form: SignUp) -> Result<Account, AccountError> {
        validate(&form)?;

        if self.store.exists_by_username(&form.username)? {
            return Err(AccountError::Conflict);
        }

        let token = generate_verification_token();
        // Run Argon2 in a blocking thread to avoid starving the runtime
        let secret = form.secret.clone();
        let secret_hash = tokio::task::spawn_blocking(move || hash_secret(&secret))
            .await
            .map_err(|e| AccountError::Internal(e.to_string()))??;

        let created = self.directory.create_user(&form).await.map_err(|e| {
            warn!("Remote signup for '{}' failed: {}", form.username, e);
            AccountError::from(e)
        })?;
        let remote_id = created.get("id").and_then(Value::as_i64);

        let account = Account::pending(&form, secret_hash, token.clone(), remote_id);
        let account = match self.store.save(account) {
            Ok(account) => account,
            Err(e) => {
                error!("Saving '{}' failed after remote create: {}", form.username, e);
                self.undo_remote_create(remote_id).await;
                return Err(e.into());
            }
        };

        if let Err(e) = self.notifier.send_verification(&account.email, &token).await {
            warn!("Verification mail to {} failed: {}", account.email, e);
        }

        info!("User '{}' registered", account.username);
        Ok(account)
    }

    // Compensating action for a half-finished signup
    async fn undo_remote_create(&self, remote_id: Option<RemoteId>) {
        let Some(id) = remote_id else {
            warn!("Remote user left behind: create response carried no id");
            return;
        };
        match self.directory.delete_user(id).await {
            Ok(()) => info!("Rolled back remote user {}", id),
            Err(e) => error!("Remote user {} left behind: {}", id, e),
        }
    }

    /// Check the credentials locally, then return the remote profile.
    pub async fn login(&self, username: &str, secret: &str) -> Result<Value, AccountError> {
        let account = self
            .store
            .find_by_username(username)?
            .ok_or(AccountError::NotFound)?;

        let (given, stored) = (secret.to_string(), account.secret_hash.clone());
        tokio::task::spawn_blocking(move || verify_secret(&given, &stored))
            .await
            .map_err(|e| AccountError::Internal(e.to_string()))??;

        if account.is_pending() {
            return Err(AccountError::Unverified);
        }

        Ok(self.directory.me(username, secret).await?)
    }

    /// Consume a verification token. A token works exactly once.
    pub async fn verify_email(&self, token: &str) -> Result<Account, AccountError> {
        let account = self
            .store
            .consume_verification_token(token)?
            .ok_or(AccountError::InvalidToken)?;

        info!("User '{}' verified", account.username);
        Ok(account)
    }

    /// All users known to the remote directory.
    pub async fn list_all_accounts(&self) -> Result<Vec<Value>, AccountError> {
        self.directory.list_users().await.map_err(|e| {
            warn!("Listing remote users failed: {}", e);
            AccountError::from(e)
        })
    }

    /// Delete a user from the remote directory. Local records are left alone.
    pub async fn delete_account(&self, remote_id: RemoteId) -> Result<(), AccountError> {
        self.directory.delete_user(remote_id).await?;
        info!("Remote user {} deleted", remote_id);
        Ok(())
    }
}

fn validate(form: &SignUp) -> Result<(), AccountError> {
    for (field, value) in [
        ("username", &form.username),
        ("secret", &form.secret),
        ("email", &form.email),
    ] {
        if value.trim().is_empty() {
            return Err(AccountError::Validation(format!("Missing {}", field)));
        }
    }
    Ok(())
}
