// Client-side session: the persisted identity every API client shares

use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use super::error::{ClientError, ClientResult};

/// Keys of the persisted identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    AuthToken,
    RefreshToken,
    User,
    UserName,
    UserRole,
}

impl SessionKey {
    pub const ALL: [SessionKey; 5] = [
        SessionKey::AuthToken,
        SessionKey::RefreshToken,
        SessionKey::User,
        SessionKey::UserName,
        SessionKey::UserRole,
    ];

    /// Storage key name
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKey::AuthToken => "authToken",
            SessionKey::RefreshToken => "refreshToken",
            SessionKey::User => "user",
            SessionKey::UserName => "userName",
            SessionKey::UserRole => "userRole",
        }
    }
}

/// Key-value storage behind a session
pub trait SessionStore: Send + Sync {
    fn get(&self, key: SessionKey) -> Option<String>;
    fn set(&self, key: SessionKey, value: &str) -> ClientResult<()>;
    fn remove(&self, key: SessionKey) -> ClientResult<()>;
}

/// Session storage that lives as long as the process
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: RwLock<HashMap<SessionKey, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.get(&key).cloned()
    }

    fn set(&self, key: SessionKey, value: &str) -> ClientResult<()> {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: SessionKey) -> ClientResult<()> {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.remove(&key);
        Ok(())
    }
}

/// Session storage persisted as a JSON object on disk
///
/// The file is read once on open and rewritten on every change.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl FileSessionStore {
    /// Open (or lazily create) the session file at `path`
    pub fn open(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| ClientError::Session(format!("Cannot read {:?}: {}", path, e)))?;
            if raw.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&raw)
                    .map_err(|e| ClientError::Session(format!("Corrupt session file {:?}: {}", path, e)))?
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    fn persist(&self, values: &HashMap<String, String>) -> ClientResult<()> {
        let raw = serde_json::to_string_pretty(values)
            .map_err(|e| ClientError::Session(e.to_string()))?;
        fs::write(&self.path, raw)
            .map_err(|e| ClientError::Session(format!("Cannot write {:?}: {}", self.path, e)))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.get(key.as_str()).cloned()
    }

    fn set(&self, key: SessionKey, value: &str) -> ClientResult<()> {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(key.as_str().to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: SessionKey) -> ClientResult<()> {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        if values.remove(key.as_str()).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}

/// Identity captured at login
#[derive(Debug, Clone, Default)]
pub struct LoginIdentity {
    pub token: String,
    pub refresh_token: Option<String>,
    pub user: Value,
    pub user_name: Option<String>,
    pub user_role: Option<String>,
}

/// Shared handle to the persisted identity
///
/// Cloning is cheap; every clone sees the same store.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    pub fn get(&self, key: SessionKey) -> Option<String> {
        self.store.get(key).filter(|v| !v.is_empty())
    }

    pub fn token(&self) -> Option<String> {
        self.get(SessionKey::AuthToken)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.get(SessionKey::RefreshToken)
    }

    pub fn user(&self) -> Option<Value> {
        self.get(SessionKey::User)
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    pub fn user_name(&self) -> Option<String> {
        self.get(SessionKey::UserName)
    }

    pub fn user_role(&self) -> Option<String> {
        self.get(SessionKey::UserRole)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Persist everything learned at login
    pub fn store_login(&self, identity: &LoginIdentity) -> ClientResult<()> {
        self.store_tokens(&identity.token, identity.refresh_token.as_deref())?;
        self.store.set(SessionKey::User, &identity.user.to_string())?;
        if let Some(ref name) = identity.user_name {
            self.store.set(SessionKey::UserName, name)?;
        }
        if let Some(ref role) = identity.user_role {
            self.store.set(SessionKey::UserRole, role)?;
        }
        Ok(())
    }

    /// Replace the token pair (refresh token only when one is given)
    pub fn store_tokens(&self, token: &str, refresh_token: Option<&str>) -> ClientResult<()> {
        self.store.set(SessionKey::AuthToken, token)?;
        if let Some(refresh) = refresh_token {
            self.store.set(SessionKey::RefreshToken, refresh)?;
        }
        Ok(())
    }

    /// Remove every identity key
    ///
    /// All keys are attempted even if one removal fails; the first error
    /// is returned.
    pub fn clear(&self) -> ClientResult<()> {
        let mut first_error = None;
        for key in SessionKey::ALL {
            if let Err(e) = self.store.remove(key) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
