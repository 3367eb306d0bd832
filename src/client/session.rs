//! Session context
//!
//! Holds the bearer token and the authenticated user for one application
//! session. The context is created once and handed to the API client; the
//! token is persisted through a [`TokenStore`] so it survives restarts of
//! the CLI the way a browser keeps it in local storage.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

use crate::domain::User;

/// Errors from reading or writing the persisted token
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to read token file {path:?}: {error}")]
    Read { path: PathBuf, error: String },

    #[error("Failed to write token file {path:?}: {error}")]
    Write { path: PathBuf, error: String },
}

/// Persistence for the bearer token
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, SessionError>;
    fn save(&self, token: &str) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Stores the token in a file named after the configured key
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(key),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SessionError::Read {
                path: self.path.clone(),
                error: e.to_string(),
            }),
        }
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        let write_err = |e: std::io::Error| SessionError::Write {
            path: self.path.clone(),
            error: e.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(&self.path, token).map_err(write_err)
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Write {
                path: self.path.clone(),
                error: e.to_string(),
            }),
        }
    }
}

/// Keeps the token in memory only
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Token and user for the current application session
pub struct SessionContext {
    store: Arc<dyn TokenStore>,
    token: RwLock<Option<String>>,
    user: RwLock<Option<User>>,
}

impl SessionContext {
    /// Create a session, restoring any token already persisted in `store`
    pub fn restore(store: Arc<dyn TokenStore>) -> Result<Self, SessionError> {
        let token = store.load()?;
        Ok(Self {
            store,
            token: RwLock::new(token),
            user: RwLock::new(None),
        })
    }

    /// A session that never touches disk
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(MemoryTokenStore::default()),
            token: RwLock::new(None),
            user: RwLock::new(None),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn user(&self) -> Option<User> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Start a session after a successful login
    pub fn begin(&self, token: &str, user: Option<User>) -> Result<(), SessionError> {
        self.store.save(token)?;
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        self.set_user(user);
        Ok(())
    }

    pub fn set_user(&self, user: Option<User>) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = user;
    }

    /// Log out: forget the token and user
    pub fn end(&self) -> Result<(), SessionError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.set_user(None);
        self.store.clear()
    }

    /// The backend rejected the token; drop it so the next command asks for a login
    pub fn invalidate(&self) {
        if let Err(e) = self.end() {
            tracing::warn!("Failed to clear stored token: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path(), "pos_token");

        assert_eq!(store.load().unwrap(), None);
        store.save("abc.def.ghi").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc.def.ghi"));
        assert!(store.path().ends_with("pos_token"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_session_restores_persisted_token() {
        let dir = tempdir().unwrap();
        let store = Arc::new(FileTokenStore::new(dir.path(), "token"));
        store.save("persisted").unwrap();

        let session = SessionContext::restore(store).unwrap();
        assert_eq!(session.token().as_deref(), Some("persisted"));
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_invalidate_clears_store_and_user() {
        let store = Arc::new(MemoryTokenStore::default());
        let session = SessionContext::restore(store.clone()).unwrap();

        let user = User {
            id: Some(1),
            email: Some("admin@shop.test".to_string()),
            role: Some("admin".to_string()),
        };
        session.begin("tok", Some(user)).unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("tok"));
        assert!(session.user().is_some());

        session.invalidate();
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert_eq!(store.load().unwrap(), None);
    }
}
