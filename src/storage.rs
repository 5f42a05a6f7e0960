//! Persistent account storage on sled
//!
//! Three trees are kept in step inside one transaction:
//! `accounts` (id -> account), `usernames` (username -> id) and
//! `tokens` (verification token -> id).

use crate::account::Account;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Db, Transactional, Tree};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("username '{0}' already exists")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sled::Error),
    #[error("corrupt account record: {0}")]
    Codec(String),
}

pub struct AccountStore {
    db: Db,
    accounts: Tree,
    usernames: Tree,
    tokens: Tree,
}

impl AccountStore {
    /// Open (or create) the store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::from_db(sled::open(path)?)
    }

    /// In-memory store, removed on drop
    pub fn temporary() -> Result<Self, StoreError> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: Db) -> Result<Self, StoreError> {
        Ok(Self {
            accounts: db.open_tree("accounts")?,
            usernames: db.open_tree("usernames")?,
            tokens: db.open_tree("tokens")?,
            db,
        })
    }

    // --- Lookups ---

    pub fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        match self.usernames.get(username.as_bytes())? {
            Some(id) => self.get_raw(&id),
            None => Ok(None),
        }
    }

    pub fn exists_by_username(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.usernames.contains_key(username.as_bytes())?)
    }

    pub fn find_by_verification_token(&self, token: &str) -> Result<Option<Account>, StoreError> {
        match self.tokens.get(token.as_bytes())? {
            Some(id) => self.get_raw(&id),
            None => Ok(None),
        }
    }

    fn get_raw(&self, id: &[u8]) -> Result<Option<Account>, StoreError> {
        match self.accounts.get(id)? {
            Some(data) => decode(&data).map(Some),
            None => Ok(None),
        }
    }

    /// All accounts, in id order
    pub fn all(&self) -> Result<Vec<Account>, StoreError> {
        self.accounts
            .iter()
            .values()
            .map(|data| decode(&data?))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    // --- Writes ---

    /// Insert the account if it has no id yet, otherwise update it.
    ///
    /// Username uniqueness is checked inside the same transaction as the
    /// write, so two racing signups for one name cannot both land.
    pub fn save(&self, account: Account) -> Result<Account, StoreError> {
        let mut account = account;
        if account.id.is_none() {
            account.id = Some(self.db.generate_id()?);
        }
        let id = account.id.unwrap_or_default().to_be_bytes();
        let encoded = bincode::serialize(&account).map_err(|e| StoreError::Codec(e.to_string()))?;

        let result = (&self.accounts, &self.usernames, &self.tokens).transaction(
            |(accounts, usernames, tokens)| {
                if let Some(owner) = usernames.get(account.username.as_bytes())? {
                    if owner[..] != id[..] {
                        return Err(ConflictableTransactionError::Abort(StoreError::Conflict(
                            account.username.clone(),
                        )));
                    }
                }

                if let Some(previous) = accounts.get(id)? {
                    let previous = decode(&previous).map_err(ConflictableTransactionError::Abort)?;
                    if previous.username != account.username {
                        usernames.remove(previous.username.as_bytes())?;
                    }
                    if let Some(old_token) = previous.verification_token {
                        if account.verification_token.as_deref() != Some(old_token.as_str()) {
                            tokens.remove(old_token.as_bytes())?;
                        }
                    }
                }

                usernames.insert(account.username.as_bytes(), &id[..])?;
                if let Some(token) = &account.verification_token {
                    tokens.insert(token.as_bytes(), &id[..])?;
                }
                accounts.insert(&id[..], encoded.as_slice())?;
                Ok(())
            },
        );

        match result {
            Ok(()) => Ok(account),
            Err(TransactionError::Abort(e)) => Err(e),
            Err(TransactionError::Storage(e)) => Err(StoreError::Database(e)),
        }
    }

    /// Retire `token` and mark its owner verified in one transaction.
    ///
    /// `None` when the token is unknown or was already used.
    pub fn consume_verification_token(&self, token: &str) -> Result<Option<Account>, StoreError> {
        let result = (&self.accounts, &self.tokens).transaction(|(accounts, tokens)| {
            let Some(id) = tokens.remove(token.as_bytes())? else {
                return Ok(None);
            };
            let Some(data) = accounts.get(&id[..])? else {
                return Ok(None);
            };

            let mut account = decode(&data).map_err(ConflictableTransactionError::Abort)?;
            account.mark_verified();
            let encoded = bincode::serialize(&account)
                .map_err(|e| ConflictableTransactionError::Abort(StoreError::Codec(e.to_string())))?;
            accounts.insert(&id[..], encoded)?;
            Ok(Some(account))
        });

        match result {
            Ok(account) => Ok(account),
            Err(TransactionError::Abort(e)) => Err(e),
            Err(TransactionError::Storage(e)) => Err(StoreError::Database(e)),
        }
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}

fn decode(data: &[u8]) -> Result<Account, StoreError> {
    bincode::deserialize(data).map_err(|e| StoreError::Codec(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::SignUp;

    fn pending(username: &str, token: &str) -> Account {
        let form = SignUp {
            username: username.to_string(),
            secret: "pw".to_string(),
            email: format!("{}@x.com", username),
            first_name: "F".to_string(),
            last_name: "L".to_string(),
        };
        Account::pending(&form, "hash".to_string(), token.to_string(), None)
    }

    #[test]
    fn test_save_assigns_id() {
        let store = AccountStore::temporary().unwrap();
        let saved = store.save(pending("alice", "t1")).unwrap();

        assert!(saved.id.is_some());
        assert_eq!(store.len(), 1);
        assert!(store.exists_by_username("alice").unwrap());
        assert!(!store.exists_by_username("Alice").unwrap());
        assert_eq!(store.find_by_username("alice").unwrap(), Some(saved.clone()));
        assert_eq!(store.find_by_verification_token("t1").unwrap(), Some(saved));
    }

    #[test]
    fn test_duplicate_username_conflicts() {
        let store = AccountStore::temporary().unwrap();
        store.save(pending("alice", "t1")).unwrap();

        // No pre-check here: the store itself must refuse the second insert
        let err = store.save(pending("alice", "t2")).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(name) if name == "alice"));
        assert_eq!(store.len(), 1);
        assert!(store.find_by_verification_token("t2").unwrap().is_none());
    }

    #[test]
    fn test_update_clears_token_index() {
        let store = AccountStore::temporary().unwrap();
        let mut account = store.save(pending("bob", "t1")).unwrap();
        let id = account.id;

        account.mark_verified();
        let updated = store.save(account).unwrap();

        assert_eq!(updated.id, id);
        assert_eq!(store.len(), 1);
        assert!(store.find_by_verification_token("t1").unwrap().is_none());
        assert!(store.find_by_username("bob").unwrap().unwrap().verified);
    }

    #[test]
    fn test_rename_moves_username_index() {
        let store = AccountStore::temporary().unwrap();
        let mut account = store.save(pending("carol", "t1")).unwrap();

        account.username = "caroline".to_string();
        store.save(account).unwrap();

        assert!(!store.exists_by_username("carol").unwrap());
        assert!(store.exists_by_username("caroline").unwrap());
    }

    #[test]
    fn test_consume_token_once() {
        let store = AccountStore::temporary().unwrap();
        store.save(pending("dave", "t1")).unwrap();

        let verified = store.consume_verification_token("t1").unwrap().unwrap();
        assert!(verified.verified);
        assert!(verified.verification_token.is_none());
        assert!(store.find_by_username("dave").unwrap().unwrap().verified);

        assert!(store.consume_verification_token("t1").unwrap().is_none());
        assert!(store.consume_verification_token("nope").unwrap().is_none());
    }

    #[test]
    fn test_concurrent_consume_has_one_winner() {
        let store = AccountStore::temporary().unwrap();
        store.save(pending("erin", "t1")).unwrap();

        let wins = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| store.consume_verification_token("t1").unwrap()))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(Option::is_some)
                .count()
        });
        assert_eq!(wins, 1);
    }

    #[test]
    fn test_all_in_id_order() {
        let store = AccountStore::temporary().unwrap();
        store.save(pending("a", "t1")).unwrap();
        store.save(pending("b", "t2")).unwrap();

        let names: Vec<String> = store.all().unwrap().into_iter().map(|a| a.username).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
