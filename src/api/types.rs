// Request bodies and query parameters of the HTTP API
use serde::Deserialize;

pub use crate::account::SignUp as SignUpRequest;

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub secret: String,
}

#[derive(Deserialize, Debug)]
pub struct VerifyParams {
    pub token: String,
}

pub const SIGNUP_OK: &str = "User registered successfully";
pub const DELETE_OK: &str = "User deleted successfully";
pub const DELETE_FAILED: &str = "Failed to delete user";
pub const VERIFY_OK: &str = "Email verified successfully";
