//! Token stores: where the session lives between requests.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use hrms_core::config::{AuthConfig, TokenStoreKind};
use hrms_core::error::AppError;
use hrms_core::result::AppResult;
use hrms_entity::{Role, Session};

/// Keys under which the session is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Access token.
    AccessToken,
    /// Refresh token.
    RefreshToken,
    /// Role code.
    Role,
    /// Backend user id.
    UserId,
    /// Login email.
    Email,
    /// Display name.
    Username,
}

impl StorageKey {
    /// Every key, in persistence order.
    pub const ALL: [StorageKey; 6] = [
        StorageKey::AccessToken,
        StorageKey::RefreshToken,
        StorageKey::Role,
        StorageKey::UserId,
        StorageKey::Email,
        StorageKey::Username,
    ];

    /// The persisted key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessToken => "token",
            Self::RefreshToken => "refreshToken",
            Self::Role => "role",
            Self::UserId => "userId",
            Self::Email => "email",
            Self::Username => "username",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value store holding the single active session.
pub trait TokenStore: Send + Sync + fmt::Debug + 'static {
    /// Read a value.
    fn get(&self, key: StorageKey) -> Option<String>;

    /// Write a value.
    fn set(&self, key: StorageKey, value: &str) -> AppResult<()>;

    /// Remove a value.
    fn remove(&self, key: StorageKey) -> AppResult<()>;

    /// Remove every value.
    fn clear(&self) -> AppResult<()>;

    /// Snapshot of the stored session.
    fn session(&self) -> Session {
        Session {
            access_token: self.get(StorageKey::AccessToken),
            refresh_token: self.get(StorageKey::RefreshToken),
            role: self
                .get(StorageKey::Role)
                .and_then(|r| r.parse::<Role>().ok()),
            user_id: self.get(StorageKey::UserId),
            email: self.get(StorageKey::Email),
            username: self.get(StorageKey::Username),
        }
    }

    /// Replace the stored session wholesale.
    fn save_session(&self, session: &Session) -> AppResult<()> {
        self.clear()?;
        let role = session.role.map(|r| r.code().to_string());
        let values = [
            (StorageKey::AccessToken, session.access_token.as_deref()),
            (StorageKey::RefreshToken, session.refresh_token.as_deref()),
            (StorageKey::Role, role.as_deref()),
            (StorageKey::UserId, session.user_id.as_deref()),
            (StorageKey::Email, session.email.as_deref()),
            (StorageKey::Username, session.username.as_deref()),
        ];
        for (key, value) in values {
            if let Some(value) = value {
                self.set(key, value)?;
            }
        }
        Ok(())
    }
}

/// Build the token store selected by configuration.
pub fn from_config(config: &AuthConfig) -> AppResult<Arc<dyn TokenStore>> {
    match config.token_store {
        TokenStoreKind::Memory => Ok(Arc::new(MemoryTokenStore::new())),
        TokenStoreKind::File => Ok(Arc::new(FileTokenStore::open(&config.token_store_path)?)),
    }
}

/// Process-local token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    values: DashMap<StorageKey, String>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: StorageKey) -> Option<String> {
        self.values.get(&key).map(|v| v.value().clone())
    }

    fn set(&self, key: StorageKey, value: &str) -> AppResult<()> {
        self.values.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> AppResult<()> {
        self.values.remove(&key);
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        self.values.clear();
        Ok(())
    }
}

/// Token store mirrored to a JSON file after every write.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    values: DashMap<StorageKey, String>,
}

impl FileTokenStore {
    /// Open the store at `path`.
    ///
    /// A missing file yields an empty store; a corrupt one is ignored with
    /// a warning and overwritten by the next write.
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let values = DashMap::new();

        match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(stored) => {
                    for key in StorageKey::ALL {
                        if let Some(value) = stored.get(key.as_str()) {
                            values.insert(key, value.clone());
                        }
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring corrupt session file");
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No session file yet");
            }
            Err(e) => {
                return Err(AppError::with_source(
                    hrms_core::ErrorKind::Storage,
                    format!("Failed to read session file {}", path.display()),
                    e,
                ));
            }
        }

        Ok(Self { path, values })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> AppResult<()> {
        let snapshot: BTreeMap<&str, String> = StorageKey::ALL
            .iter()
            .filter_map(|key| self.values.get(key).map(|v| (key.as_str(), v.value().clone())))
            .collect();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(&snapshot)?)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: StorageKey) -> Option<String> {
        self.values.get(&key).map(|v| v.value().clone())
    }

    fn set(&self, key: StorageKey, value: &str) -> AppResult<()> {
        self.values.insert(key, value.to_string());
        self.persist()
    }

    fn remove(&self, key: StorageKey) -> AppResult<()> {
        self.values.remove(&key);
        self.persist()
    }

    fn clear(&self) -> AppResult<()> {
        self.values.clear();
        self.persist()
    }
}
