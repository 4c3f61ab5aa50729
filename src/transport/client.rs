//! Backend REST Client
//!
//! Thin HTTP layer shared by all resource services. It injects the bearer
//! token, tags each request with an ID for the logs, unwraps the
//! backend's `{ "data": ... }` envelope and normalizes failures into
//! [`ApiError`].

use reqwest::{multipart::Form, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::credentials::CredentialStore;
use super::error::{ApiError, ApiResult};

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Default request timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Invoked after a 401 once the token has been discarded
pub type UnauthorizedHandler = Arc<dyn Fn() + Send + Sync>;

/// Connection settings for [`ApiClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL including the API prefix (e.g. "http://localhost:8000/api/v1")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// HTTP transport for the Hotel BI backend
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
    credentials: Arc<dyn CredentialStore>,
    on_unauthorized: Option<UnauthorizedHandler>,
}

impl ApiClient {
    /// Create a client reading its token from `credentials`
    pub fn new(config: ClientConfig, credentials: Arc<dyn CredentialStore>) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(concat!("hotel-bi/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        let config = ClientConfig {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ..config
        };

        Ok(Self {
            client,
            config,
            credentials,
            on_unauthorized: None,
        })
    }

    /// Register the hook run when the backend rejects the session
    pub fn with_unauthorized_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_unauthorized = Some(Arc::new(handler));
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    /// GET a JSON resource
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.execute(Method::GET, path, |req| req).await?;
        read_envelope(response).await
    }

    /// GET a JSON resource with query parameters
    pub async fn get_json_with_query<T, Q>(&self, path: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self.execute(Method::GET, path, |req| req.query(query)).await?;
        read_envelope(response).await
    }

    /// POST a JSON body
    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.execute(Method::POST, path, |req| req.json(body)).await?;
        read_envelope(response).await
    }

    /// POST without a body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.execute(Method::POST, path, |req| req).await?;
        read_envelope(response).await
    }

    /// POST a multipart form
    pub async fn post_multipart<T>(&self, path: &str, form: Form) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .execute(Method::POST, path, move |req| req.multipart(form))
            .await?;
        read_envelope(response).await
    }

    /// DELETE a resource
    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.execute(Method::DELETE, path, |req| req).await?;
        read_envelope(response).await
    }

    /// GET a binary payload (report downloads)
    pub async fn get_bytes<Q>(&self, path: &str, query: &Q) -> ApiResult<Vec<u8>>
    where
        Q: Serialize + ?Sized,
    {
        let response = self.execute(Method::GET, path, |req| req.query(query)).await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Build, authenticate and send a request, normalizing failures
    async fn execute<F>(&self, method: Method, path: &str, customize: F) -> ApiResult<Response>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = self.url(path);
        let request_id = uuid::Uuid::new_v4().to_string();

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header("X-Request-ID", &request_id);

        if let Some(token) = self.credentials.get() {
            request = request.bearer_auth(token);
        }

        let request = customize(request);

        tracing::debug!(request_id = %request_id, method = %method, url = %url, "Sending request");

        let response = request.send().await.map_err(|e| {
            let err = ApiError::from(e);
            tracing::debug!(request_id = %request_id, error = %err, "Request failed");
            err
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(
                request_id = %request_id,
                url = %url,
                "Session rejected, discarding token"
            );
            self.credentials.clear();
            if let Some(handler) = &self.on_unauthorized {
                handler();
            }
            return Err(ApiError::Unauthorized);
        }

        let text = response.text().await.unwrap_or_default();
        let message = error_message(&text);

        tracing::debug!(
            request_id = %request_id,
            status = status.as_u16(),
            message = %message,
            "Backend returned an error"
        );

        if status == StatusCode::NOT_FOUND {
            Err(ApiError::NotFound { message })
        } else {
            Err(ApiError::Http {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Decode a successful body, unwrapping `{ "data": ... }` when present
async fn read_envelope<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let text = response.text().await?;
    decode_envelope(&text)
}

pub(crate) fn decode_envelope<T: DeserializeOwned>(text: &str) -> ApiResult<T> {
    let value: serde_json::Value = if text.trim().is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(text)?
    };

    let payload = match value {
        serde_json::Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(serde_json::Value::Null)
        }
        other => other,
    };

    Ok(serde_json::from_value(payload)?)
}

/// Pull a human-readable message out of an error body
pub(crate) fn error_message(text: &str) -> String {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => {
            let trimmed = text.trim();
            return if trimmed.is_empty() {
                "Request failed".to_string()
            } else {
                trimmed.to_string()
            };
        }
    };

    for key in ["detail", "message", "error"] {
        match value.get(key) {
            Some(serde_json::Value::String(s)) if !s.is_empty() => return s.clone(),
            Some(serde_json::Value::Null) | None => continue,
            Some(other) => return other.to_string(),
        }
    }

    "Request failed".to_string()
}
