//! Account type definitions for the chat gateway

use serde::{Deserialize, Serialize};

/// Local account identifier, assigned by the store on first save
pub type AccountId = u64;

/// Identifier the remote chat directory uses for the same user
pub type RemoteId = i64;

/// Main account structure
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Account {
    // Identity
    pub id: Option<AccountId>,
    pub username: String,

    // Authentication
    pub secret_hash: String, // Argon2id PHC string

    // Profile
    pub email: String,
    pub first_name: String,
    pub last_name: String,

    // Verification
    pub verification_token: Option<String>,
    pub verified: bool,

    // State
    pub remote_id: Option<RemoteId>,
    pub created_at: i64,
}

/// Fields submitted by a user signing up
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SignUp {
    pub username: String,
    pub secret: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Account {
    /// Build a fresh, unverified account awaiting its verification link
    pub fn pending(
        form: &SignUp,
        secret_hash: String,
        verification_token: String,
        remote_id: Option<RemoteId>,
    ) -> Self {
        Self {
            id: None,
            username: form.username.clone(),
            secret_hash,
            email: form.email.clone(),
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            verification_token: Some(verification_token),
            verified: false,
            remote_id,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Mark the email as verified. The token is consumed and never matches again.
    pub fn mark_verified(&mut self) {
        self.verified = true;
        self.verification_token = None;
    }

    /// Check if the account still waits for email verification
    pub fn is_pending(&self) -> bool {
        !self.verified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> SignUp {
        SignUp {
            username: "alice".to_string(),
            secret: "pw1".to_string(),
            email: "a@x.com".to_string(),
            first_name: "A".to_string(),
            last_name: "L".to_string(),
        }
    }

    #[test]
    fn test_pending_account() {
        let account = Account::pending(&form(), "hash".to_string(), "tok".to_string(), Some(7));

        assert_eq!(account.id, None);
        assert_eq!(account.username, "alice");
        assert_eq!(account.verification_token.as_deref(), Some("tok"));
        assert!(account.is_pending());
        assert_eq!(account.remote_id, Some(7));
    }

    #[test]
    fn test_mark_verified_clears_token() {
        let mut account = Account::pending(&form(), "hash".to_string(), "tok".to_string(), None);
        account.mark_verified();

        assert!(account.verified);
        assert!(account.verification_token.is_none());
    }
}
