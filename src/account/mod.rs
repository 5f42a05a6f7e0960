//! Account System Module
//!
//! This module implements the local side of a chat user's lifecycle:
//! - Signup mirrored to the remote chat directory
//! - Argon2id secret hashing
//! - Single-use email verification tokens

pub mod types;
pub mod auth;
pub mod service;

pub use types::{Account, AccountId, RemoteId, SignUp};
pub use service::AccountService;
