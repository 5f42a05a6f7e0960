//! Verification mail delivery

use crate::config::MailConfig;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

pub const VERIFICATION_SUBJECT: &str = "Verify your email address";

#[derive(Error, Debug)]
pub enum MailError {
    #[error("invalid address '{0}'")]
    Address(String),
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Sends the single verification email of a signup.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_verification(&self, to: &str, token: &str) -> Result<(), MailError>;
}

/// Link the user follows to verify their address
pub fn verification_link(base_url: &str, token: &str) -> String {
    format!("{}/verify?token={}", base_url.trim_end_matches('/'), token)
}

pub fn verification_body(base_url: &str, token: &str) -> String {
    format!(
        "Please click the following link to verify your email address: {}",
        verification_link(base_url, token)
    )
}

/// Plaintext mail over an authenticated STARTTLS relay
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: String,
    verify_base_url: String,
}

impl SmtpNotifier {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let credentials = Credentials::new(config.sender.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            sender: config.sender.clone(),
            verify_base_url: config.verify_base_url.clone(),
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_verification(&self, to: &str, token: &str) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.sender.parse().map_err(|_| MailError::Address(self.sender.clone()))?)
            .to(to.parse().map_err(|_| MailError::Address(to.to_string()))?)
            .subject(VERIFICATION_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(verification_body(&self.verify_base_url, token))?;

        self.transport.send(message).await?;
        info!("Verification mail sent to {}", to);
        Ok(())
    }
}

/// Logs the link instead of mailing it. Used when no SMTP password is set.
pub struct LogNotifier {
    verify_base_url: String,
}

impl LogNotifier {
    pub fn new(verify_base_url: &str) -> Self {
        Self {
            verify_base_url: verify_base_url.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_verification(&self, to: &str, token: &str) -> Result<(), MailError> {
        info!(
            "📧 Mail disabled, verification link for {}: {}",
            to,
            verification_link(&self.verify_base_url, token)
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_body() {
        let body = verification_body("https://chat.example.com/", "abc123");
        assert_eq!(
            body,
            "Please click the following link to verify your email address: https://chat.example.com/verify?token=abc123"
        );
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        let notifier = LogNotifier::new("http://localhost:8080");
        assert!(notifier.send_verification("a@x.com", "tok").await.is_ok());
    }

    #[tokio::test]
    async fn test_smtp_rejects_bad_recipient_before_sending() {
        let notifier = SmtpNotifier::new(&MailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            sender: "no-reply@example.com".to_string(),
            password: "secret".to_string(),
            verify_base_url: "http://localhost:8080".to_string(),
        })
        .unwrap();

        let err = notifier.send_verification("not an address", "tok").await.unwrap_err();
        assert!(matches!(err, MailError::Address(addr) if addr == "not an address"));
    }
}
