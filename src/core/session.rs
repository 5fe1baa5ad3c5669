//! Session and authorization gate
//!
//! A [`Session`] is a plain value handed to every gated operation. The CLI
//! keeps the logged-in identity in `.pqc/session.yaml` between invocations
//! and re-reads the user from the store each time, so deleted users and
//! revoked admin rights take effect immediately.

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::error::AuthError;
use crate::core::identity::UserId;
use crate::core::password::verify_password;
use crate::core::store::{Store, StoreError};
use crate::core::workspace::Workspace;
use crate::entities::user::User;

/// Who is using the tool right now
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    #[default]
    LoggedOut,
    LoggedIn(User),
}

impl Session {
    /// Authenticate by exact username and password
    ///
    /// Unknown users and wrong passwords produce the same error. A failed
    /// attempt leaves the session unchanged.
    pub fn login(
        &mut self,
        store: &Store,
        username: &str,
        password: &str,
    ) -> Result<&User, AuthError> {
        let user = match store.get_user_by_username(username)? {
            Some(user) if verify_password(password, &user.password_hash) => user,
            _ => {
                tracing::warn!(username, "rejected login");
                return Err(AuthError::InvalidCredentials);
            }
        };
        tracing::info!(username, "logged in");
        *self = Session::LoggedIn(user);
        self.require_user()
    }

    pub fn logout(&mut self) {
        if let Session::LoggedIn(user) = self {
            tracing::info!(username = %user.username, "logged out");
        }
        *self = Session::LoggedOut;
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Session::LoggedIn(user) => Some(user),
            Session::LoggedOut => None,
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user().and_then(|u| u.id)
    }

    pub fn is_logged_in(&self) -> bool {
        self.user().is_some()
    }

    /// False when logged out
    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(|u| u.is_admin)
    }

    pub fn require_user(&self) -> Result<&User, AuthError> {
        self.user().ok_or(AuthError::NotLoggedIn)
    }

    pub fn require_admin(&self) -> Result<&User, AuthError> {
        let user = self.require_user()?;
        if user.is_admin {
            Ok(user)
        } else {
            Err(AuthError::AdminRequired)
        }
    }

    /// Load the persisted session of a workspace
    ///
    /// A missing or unreadable session file, or one naming a user that no
    /// longer exists, yields [`Session::LoggedOut`].
    pub fn restore(workspace: &Workspace, store: &Store) -> Result<Session, StoreError> {
        let path = workspace.session_path();
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Ok(Session::LoggedOut),
        };
        let file: SessionFile = match serde_yml::from_str(&contents) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable session file");
                return Ok(Session::LoggedOut);
            }
        };

        match store.get_user(file.user_id)? {
            Some(user) if user.username == file.username => {
                tracing::debug!(username = %user.username, since = %file.logged_in_at, "restored session");
                Ok(Session::LoggedIn(user))
            }
            _ => {
                tracing::debug!(username = %file.username, "session user no longer exists");
                Ok(Session::LoggedOut)
            }
        }
    }

    /// Write the session to the workspace, or remove it when logged out
    pub fn persist(&self, workspace: &Workspace) -> Result<(), SessionError> {
        let path = workspace.session_path();
        match self.user() {
            Some(user) => {
                let id = user.id.ok_or(SessionError::UnsavedUser)?;
                let file = SessionFile {
                    user_id: id,
                    username: user.username.clone(),
                    logged_in_at: Utc::now(),
                };
                std::fs::write(&path, serde_yml::to_string(&file)?)?;
            }
            None => {
                if path.exists() {
                    std::fs::remove_file(&path)?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    user_id: UserId,
    username: String,
    logged_in_at: DateTime<Utc>,
}

/// Errors writing the session file
#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    #[error("could not write session file: {0}")]
    #[diagnostic(code(pqc::session::io))]
    Io(#[from] std::io::Error),

    #[error("could not encode session: {0}")]
    #[diagnostic(code(pqc::session::format))]
    Format(#[from] serde_yml::Error),

    #[error("cannot persist a session for a user that has not been saved")]
    #[diagnostic(code(pqc::session::unsaved_user))]
    UnsavedUser,
}
