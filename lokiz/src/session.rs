//! The signed-in session, shared by the API client and the shell.
//!
//! [`Session`] is a cheap cloneable handle. Every mutation is written through
//! to the JSON file it was loaded from, so a restart resumes the same login
//! and a cleared session stays cleared.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::types::AccountUser;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file is not valid JSON: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// What is persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub user: Option<AccountUser>,
    pub token: Option<String>,
    pub is_authenticated: bool,
}

#[derive(Clone, Debug, Default)]
pub struct Session {
    inner: Arc<RwLock<SessionState>>,
    path: Option<Arc<PathBuf>>,
}

impl Session {
    /// Session that lives in memory only.
    pub fn ephemeral() -> Self {
        Self::default()
    }

    /// Opens the session file. Missing files start signed out; unreadable
    /// contents are logged and discarded.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let state = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<SessionState>(&bytes) {
                Ok(state) => state,
                Err(err) => {
                    warn!("session file {} was invalid ({err}), starting signed out", path.display());
                    SessionState::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => SessionState::default(),
            Err(err) => return Err(err.into()),
        };
        if state.is_authenticated {
            info!("resumed session for {}", state.user.as_ref().map_or("<unknown>", |u| u.username.as_str()));
        }
        Ok(Self { inner: Arc::new(RwLock::new(state)), path: Some(Arc::new(path)) })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().map(PathBuf::as_path)
    }

    // A poisoned lock only means a panic elsewhere; the state itself is plain data.
    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> SessionState {
        self.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn user(&self) -> Option<AccountUser> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated
    }

    pub fn set_auth(&self, user: AccountUser, token: String) -> Result<(), SessionError> {
        info!("signed in as {}", user.username);
        let mut state = self.write();
        *state = SessionState { user: Some(user), token: Some(token), is_authenticated: true };
        self.persist(&state)
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        let mut state = self.write();
        if state.is_authenticated {
            info!("session cleared");
        }
        *state = SessionState::default();
        self.persist(&state)
    }

    /// Applies `f` to the signed-in user. No-op while signed out.
    pub fn update_user(&self, f: impl FnOnce(&mut AccountUser)) -> Result<(), SessionError> {
        let mut state = self.write();
        match state.user.as_mut() {
            Some(user) => f(user),
            None => return Ok(()),
        }
        self.persist(&state)
    }

    fn persist(&self, state: &SessionState) -> Result<(), SessionError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_vec_pretty(state)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perm = fs::metadata(path)?.permissions();
            perm.set_mode(0o600);
            fs::set_permissions(path, perm)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(username: &str) -> AccountUser {
        AccountUser {
            id: format!("id-{username}"),
            username: username.to_string(),
            email: format!("{username}@lokiz.com"),
            display_name: None,
            bio: None,
            profile_image_url: None,
            credits: 100,
            created_at: None,
        }
    }

    #[test]
    fn survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth-storage.json");
        let session = Session::load(&path).unwrap();
        assert!(!session.is_authenticated());
        session.set_auth(account("mina"), "tok".into()).unwrap();

        let reloaded = Session::load(&path).unwrap();
        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.token().as_deref(), Some("tok"));
        assert_eq!(reloaded.user().unwrap().username, "mina");
    }

    #[test]
    fn clones_share_state_and_clear_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/auth-storage.json");
        let session = Session::load(&path).unwrap();
        let handle = session.clone();
        session.set_auth(account("mina"), "tok".into()).unwrap();
        assert!(handle.is_authenticated());

        handle.clear().unwrap();
        assert!(session.token().is_none());
        assert_eq!(Session::load(&path).unwrap().snapshot(), SessionState::default());
    }

    #[test]
    fn update_user_merges_and_ignores_signed_out() {
        let session = Session::ephemeral();
        session.update_user(|u| u.bio = Some("x".into())).unwrap();
        assert!(session.user().is_none());

        session.set_auth(account("mina"), "tok".into()).unwrap();
        session.update_user(|u| u.display_name = Some("Mina".into())).unwrap();
        let user = session.user().unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Mina"));
        assert_eq!(user.email, "mina@lokiz.com");
    }

    #[test]
    fn corrupt_file_starts_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth-storage.json");
        fs::write(&path, b"{not json").unwrap();
        assert!(!Session::load(&path).unwrap().is_authenticated());
    }
}
