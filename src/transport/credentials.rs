//! Credential storage
//!
//! The bearer token is held behind a [`CredentialStore`] so the transport
//! never reaches for ambient global state. Swap the store per deployment
//! (file-backed for the CLI) or per test (in-memory).

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Capability for reading and discarding the session token
pub trait CredentialStore: Send + Sync {
    /// Current token, if any
    fn get(&self) -> Option<String>;

    /// Replace the stored token
    fn set(&self, token: &str) -> std::io::Result<()>;

    /// Discard the stored token
    fn clear(&self);
}

/// Token held in process memory only
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn set(&self, token: &str) -> std::io::Result<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::Other, "token lock poisoned"))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
    }
}

/// Token persisted to a file between CLI invocations
///
/// On unix the file is kept owner-only (`0600`).
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default token location under the user's config directory
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("hotel-bi").join("token"))
            .unwrap_or_else(|| PathBuf::from("./.hotel-bi-token"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<String> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        let token = content.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    fn set(&self, token: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;

        // `mode` only applies on creation; tighten files left by older runs
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(token.as_bytes())?;
        tracing::debug!("Token stored in {:?}", self.path);
        Ok(())
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove token file {:?}: {}", self.path, e),
        }
    }
}
