//! HTTP Transport
//!
//! Request/response plumbing for the Hotel BI backend.
//!
//! - **ApiClient**: bearer-token injection, envelope decoding, error normalization
//! - **CredentialStore**: injected token storage (memory or file)
//! - **ApiError**: the single error shape surfaced to services and callers
//!
//! On HTTP 401 the transport discards the stored token and runs the
//! registered unauthorized handler before returning [`ApiError::Unauthorized`].

mod client;
mod credentials;
mod error;

pub use client::{
    ApiClient, ClientConfig, UnauthorizedHandler, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS,
};
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use error::{ApiError, ApiResult};
