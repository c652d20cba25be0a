use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use console_core::error::ClientError;

use crate::models::User;

/// Persisted session document: the current token pair plus the cached user
/// profile. There is exactly one current pair; `set_tokens` replaces it
/// wholesale, so a stale access token and a fresh refresh token never
/// coexist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default, with = "opt_secret")]
    access_token: Option<Secret<String>>,
    #[serde(default, with = "opt_secret")]
    refresh_token: Option<Secret<String>>,
    #[serde(default)]
    user: Option<User>,
}

mod opt_secret {
    use secrecy::{ExposeSecret, Secret};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<Secret<String>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value
            .as_ref()
            .map(|secret| secret.expose_secret())
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Secret<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.map(Secret::new))
    }
}

/// Client-side storage for the session document.
///
/// Implementations are shared across the request pipeline and the session
/// manager; reads return snapshots, writes replace whole fields.
pub trait TokenStore: Send + Sync {
    /// Replace the current token pair. Subsequent reads observe the new
    /// access token.
    fn set_tokens(&self, access: &str, refresh: &str) -> Result<(), ClientError>;

    /// Current access token, if any. Presence only; no expiry check.
    fn access_token(&self) -> Option<String>;

    /// Current refresh token, if any.
    fn refresh_token(&self) -> Option<String>;

    /// Replace the cached user profile.
    fn set_user(&self, user: &User) -> Result<(), ClientError>;

    /// Cached user profile, if any.
    fn cached_user(&self) -> Option<User>;

    /// Erase tokens and cached profile together.
    fn clear(&self) -> Result<(), ClientError>;

    /// True iff an access token is present.
    fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }
}

/// File-backed store; the session survives process restarts.
pub struct FileTokenStore {
    path: PathBuf,
    session: RwLock<StoredSession>,
}

impl FileTokenStore {
    /// Open the namespaced session document under `dir`, creating the
    /// directory if needed.
    ///
    /// An unreadable or corrupt document reads as a logged-out session
    /// rather than an error, so one bad write can never lock the user out
    /// of the login screen.
    pub fn open(namespace: &str, dir: &Path) -> Result<Self, ClientError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{namespace}_session.json"));

        let session = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(session) => session,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "corrupt session document, starting logged out"
                    );
                    StoredSession::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => StoredSession::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            session: RwLock::new(session),
        })
    }

    fn persist(&self, session: &StoredSession) -> Result<(), ClientError> {
        let bytes = serde_json::to_vec_pretty(session)
            .map_err(|e| ClientError::StorageError(anyhow::Error::new(e)))?;
        // Write-then-rename keeps the document whole under interruption.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update(&self, mutate: impl FnOnce(&mut StoredSession)) -> Result<(), ClientError> {
        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        mutate(&mut session);
        self.persist(&session)
    }

    fn snapshot(&self) -> StoredSession {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TokenStore for FileTokenStore {
    fn set_tokens(&self, access: &str, refresh: &str) -> Result<(), ClientError> {
        self.update(|session| {
            session.access_token = Some(Secret::new(access.to_owned()));
            session.refresh_token = Some(Secret::new(refresh.to_owned()));
        })
    }

    fn access_token(&self) -> Option<String> {
        self.snapshot()
            .access_token
            .map(|secret| secret.expose_secret().clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.snapshot()
            .refresh_token
            .map(|secret| secret.expose_secret().clone())
    }

    fn set_user(&self, user: &User) -> Result<(), ClientError> {
        self.update(|session| session.user = Some(user.clone()))
    }

    fn cached_user(&self) -> Option<User> {
        self.snapshot().user
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.update(|session| *session = StoredSession::default())
    }
}

/// In-memory store for tests and for hosts that keep sessions ephemeral.
#[derive(Default)]
pub struct MemoryTokenStore {
    session: RwLock<StoredSession>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoredSession {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write(&self, mutate: impl FnOnce(&mut StoredSession)) {
        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        mutate(&mut session);
    }
}

impl TokenStore for MemoryTokenStore {
    fn set_tokens(&self, access: &str, refresh: &str) -> Result<(), ClientError> {
        self.write(|session| {
            session.access_token = Some(Secret::new(access.to_owned()));
            session.refresh_token = Some(Secret::new(refresh.to_owned()));
        });
        Ok(())
    }

    fn access_token(&self) -> Option<String> {
        self.read()
            .access_token
            .map(|secret| secret.expose_secret().clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.read()
            .refresh_token
            .map(|secret| secret.expose_secret().clone())
    }

    fn set_user(&self, user: &User) -> Result<(), ClientError> {
        self.write(|session| session.user = Some(user.clone()));
        Ok(())
    }

    fn cached_user(&self) -> Option<User> {
        self.read().user
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.write(|session| *session = StoredSession::default());
        Ok(())
    }
}
