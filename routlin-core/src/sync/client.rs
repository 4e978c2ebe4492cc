//! HTTP client for the Routlin sync server.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::SyncError;
use super::protocol::{
    AuthResponse, ChangePasswordRequest, Credentials, DeleteAccountRequest, ErrorResponse,
    HealthResponse, MessageResponse, SyncRequest,
};
use crate::models::UserData;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for one sync server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    server_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            server_url: server_url.into(),
            http,
        }
    }

    /// Returns the server URL.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Creates an account and opens a session for it.
    pub async fn signup(&self, username: &str, password: &str) -> Result<AuthResponse, SyncError> {
        let body = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.post("/api/signup", &body).await
    }

    /// Opens a new session and returns the stored user data.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, SyncError> {
        let body = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.post("/api/login", &body).await
    }

    /// Replaces the server copy of the user's data with `user_data`.
    pub async fn sync(
        &self,
        username: &str,
        session_token: &str,
        user_data: &UserData,
    ) -> Result<MessageResponse, SyncError> {
        let body = SyncRequest {
            username: username.to_string(),
            session_token: session_token.to_string(),
            user_data: user_data.clone(),
        };
        self.post("/api/sync", &body).await
    }

    pub async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<MessageResponse, SyncError> {
        let body = ChangePasswordRequest {
            username: username.to_string(),
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.post("/api/change-password", &body).await
    }

    pub async fn delete_account(
        &self,
        username: &str,
        session_token: &str,
    ) -> Result<MessageResponse, SyncError> {
        let body = DeleteAccountRequest {
            username: username.to_string(),
            session_token: session_token.to_string(),
        };
        self.post("/api/delete-account", &body).await
    }

    /// Calls the server's health endpoint.
    pub async fn health(&self) -> Result<HealthResponse, SyncError> {
        let response = self.http.get(self.build_http_url("/health")).send().await?;
        Self::read_response(response).await
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, SyncError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.build_http_url(path);
        tracing::debug!(%url, "POST");
        let response = self.http.post(&url).json(body).send().await?;
        Self::read_response(response).await
    }

    async fn read_response<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, SyncError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|e| e.error)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });
        Err(SyncError::Server {
            status: status.as_u16(),
            message,
        })
    }

    /// Builds an HTTP URL for a given path.
    fn build_http_url(&self, path: &str) -> String {
        let base_url = if self.server_url.starts_with("http://")
            || self.server_url.starts_with("https://")
        {
            self.server_url.clone()
        } else {
            format!("http://{}", self.server_url)
        };

        format!("{}{}", base_url.trim_end_matches('/'), path)
    }
}

/// Checks whether the server at `server_url` is reachable and healthy.
pub async fn check_server(server_url: &str) -> Result<HealthResponse, SyncError> {
    let health = ApiClient::new(server_url).health().await?;
    if health.status != "ok" {
        return Err(SyncError::InvalidResponse(format!(
            "server reported status '{}'",
            health.status
        )));
    }
    Ok(health)
}
