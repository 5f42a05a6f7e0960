//! ChatEngine REST client

use super::{Directory, DirectoryError};
use crate::account::{RemoteId, SignUp};
use crate::config::ChatEngineConfig;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub struct ChatEngineClient {
    base_url: String,
    project_id: String,
    private_key: String,
    client: Client,
}

impl ChatEngineClient {
    pub fn new(config: &ChatEngineConfig) -> Result<Self, DirectoryError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            private_key: config.private_key.clone(),
            client: builder.build()?,
        })
    }

    // Every call negotiates JSON both ways
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
    }

    fn admin_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.request(method, path).header("Private-Key", &self.private_key)
    }
}

#[async_trait]
impl Directory for ChatEngineClient {
    async fn create_user(&self, user: &SignUp) -> Result<Value, DirectoryError> {
        let response = self
            .admin_request(Method::POST, "/users/")
            .json(user)
            .send()
            .await?;

        debug!("create_user '{}' -> {}", user.username, response.status());
        expect_json(response, |status| status == StatusCode::CREATED).await
    }

    async fn me(&self, username: &str, secret: &str) -> Result<Value, DirectoryError> {
        let response = self
            .request(Method::GET, "/users/me/")
            .header("Project-ID", &self.project_id)
            .header("User-Name", username)
            .header("User-Secret", secret)
            .send()
            .await?;

        debug!("me '{}' -> {}", username, response.status());
        expect_json(response, |status| status.is_success()).await
    }

    async fn list_users(&self) -> Result<Vec<Value>, DirectoryError> {
        let response = self.admin_request(Method::GET, "/users/").send().await?;

        debug!("list_users -> {}", response.status());
        expect_json(response, |status| status.is_success()).await
    }

    async fn delete_user(&self, id: RemoteId) -> Result<(), DirectoryError> {
        let response = self
            .admin_request(Method::DELETE, &format!("/users/{}/", id))
            .send()
            .await?;

        debug!("delete_user {} -> {}", id, response.status());
        if response.status() == StatusCode::OK {
            Ok(())
        } else {
            Err(rejected(response).await)
        }
    }
}

async fn expect_json<T: DeserializeOwned>(
    response: Response,
    accepted: impl Fn(StatusCode) -> bool,
) -> Result<T, DirectoryError> {
    if !accepted(response.status()) {
        return Err(rejected(response).await);
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| DirectoryError::Decode(e.to_string()))
}

async fn rejected(response: Response) -> DirectoryError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    DirectoryError::Rejected { status, body }
}
