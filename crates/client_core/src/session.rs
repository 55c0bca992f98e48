//! Credential ownership: the only place a session token is read, written or
//! cleared.

use std::{
    fmt, fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use shared::domain::UserId;
use tracing::{debug, info, warn};

use crate::error::ClientError;

const SESSION_DIR: &str = "legal-simplifier";
const SESSION_FILE: &str = "session.json";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    access_token: String,
    user_id: UserId,
    created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, user_id: UserId) -> Self {
        Self {
            access_token: access_token.into(),
            user_id,
            created_at: Utc::now(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Reads the `exp` claim when the token is a JWT. Informational only; the
    /// server stays the judge of validity.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let payload = self.access_token.split('.').nth(1)?;
        let decoded = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        let claims: serde_json::Value = serde_json::from_slice(&decoded).ok()?;
        let exp = claims.get("exp")?.as_i64()?;
        Utc.timestamp_opt(exp, 0).single()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("created_at", &self.created_at)
            .finish()
    }
}

pub struct SessionStore {
    path: Option<PathBuf>,
    current: Option<Session>,
}

impl SessionStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            current: None,
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(SESSION_DIR).join(SESSION_FILE))
    }

    /// Opens the store backed by `path`. A missing file means signed out; an
    /// unreadable one is treated the same way and logged.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match load_session(&path) {
            Ok(session) => session,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable session file");
                None
            }
        };
        Self {
            path: Some(path),
            current,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.is_some()
    }

    pub fn store(&mut self, session: Session) -> Result<(), ClientError> {
        if let Some(path) = &self.path {
            persist_session(path, &session)?;
            debug!(path = %path.display(), "session persisted");
        }
        info!(user_id = session.user_id.0, "session stored");
        self.current = Some(session);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), ClientError> {
        let previous = self.current.take();
        if let Some(path) = &self.path {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        if let Some(session) = previous {
            info!(user_id = session.user_id.0, "session cleared");
        }
        Ok(())
    }
}

fn load_session(path: &Path) -> Result<Option<Session>, ClientError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let session: Session = serde_json::from_str(&raw)
        .map_err(|e| ClientError::Decode(format!("session file: {e}")))?;
    if session.access_token.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(session))
}

fn persist_session(path: &Path, session: &Session) -> Result<(), ClientError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let raw = serde_json::to_string_pretty(session)
        .map_err(|e| ClientError::Other(format!("failed to encode session: {e}")))?;
    let mut file = open_private(path)?;
    file.write_all(raw.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

/// Opens the session file for writing, readable by the owner only. The mode
/// is applied at creation and re-applied to a file left by an older run.
#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<fs::File> {
    fs::File::create(path)
}
