//! Session management

use serde::Deserialize;
use std::sync::Arc;

use crate::models::{LoginRequest, LoginResult};
use crate::transport::{ApiClient, ApiResult};

#[derive(Clone)]
pub struct AuthService {
    api: Arc<ApiClient>,
}

#[derive(Debug, Deserialize)]
struct LogoutResponse {
    #[serde(default)]
    success: bool,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Authenticate and store the returned token for later requests
    ///
    /// Fails with [`ApiError::Io`](crate::transport::ApiError::Io) when the
    /// token cannot be persisted, since later requests would be rejected.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResult> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let result: LoginResult = self.api.post_json("/auth/login", &body).await?;
        self.api.credentials().set(&result.token).map_err(|e| {
            tracing::error!(user = %result.user.username, "Failed to store session token: {}", e);
            e
        })?;

        tracing::info!(user = %result.user.username, "Logged in");
        Ok(result)
    }

    /// End the session; the local token is discarded even if the call fails
    pub async fn logout(&self) -> ApiResult<bool> {
        let result: ApiResult<LogoutResponse> = self.api.post_empty("/auth/logout").await;
        self.api.credentials().clear();

        let response = result?;
        tracing::info!("Logged out");
        Ok(response.success)
    }

    pub fn is_logged_in(&self) -> bool {
        self.api.credentials().get().is_some()
    }
}
