//! Session gate: credential check gating board access.
//!
//! # Responsibility
//! - Register and authenticate users against the credential list in the kv
//!   store.
//! - Own the session marker whose presence gates board access.
//!
//! # Invariants
//! - Credentials are stored as a JSON array under one fixed key; plaintext
//!   passwords are a documented, accepted property of this store, not a
//!   recommendation.
//! - A malformed credential or session document is treated as absent, never
//!   as a fatal error.

use crate::store::kv::{kv_delete, kv_get, kv_put};
use crate::store::StoreError;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Fixed kv key holding the credential list.
pub const USERS_KV_KEY: &str = "users";
/// Fixed kv key holding the logged-in session marker.
pub const SESSION_KV_KEY: &str = "session";

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]{1,64}$").expect("valid username regex"));

pub type AuthResult<T> = Result<T, AuthError>;

/// Session gate errors.
#[derive(Debug)]
pub enum AuthError {
    /// Registration for a username that is already taken.
    AlreadyExists(String),
    /// Login with an unknown username or wrong password.
    InvalidCredentials,
    /// Username failed the charset/length check.
    InvalidUsername(String),
    /// Storage transport failure.
    Store(StoreError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyExists(username) => write!(f, "user already exists: {username}"),
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::InvalidUsername(username) => write!(f, "invalid username: `{username}`"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// One credential entry, persisted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CredentialRecord {
    username: String,
    password: String,
}

/// Proof of a successful login for this session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub username: String,
    pub token: Uuid,
}

/// Credential check gating board access.
pub struct SessionGate<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SessionGate<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Registers a new user.
    ///
    /// # Errors
    /// - `InvalidUsername` when the trimmed username fails the charset
    ///   check.
    /// - `AlreadyExists` when the username is taken.
    pub fn register(&self, username: &str, password: &str) -> AuthResult<()> {
        let username = normalize_username(username)?;

        let mut users = self.load_users()?;
        if users.iter().any(|user| user.username == username) {
            warn!("event=auth_register module=session status=rejected reason=already_exists username={username}");
            return Err(AuthError::AlreadyExists(username));
        }

        users.push(CredentialRecord {
            username: username.clone(),
            password: password.to_string(),
        });
        self.save_users(&users)?;

        info!("event=auth_register module=session status=ok username={username}");
        Ok(())
    }

    /// Authenticates and writes the session marker.
    ///
    /// # Errors
    /// - `InvalidCredentials` on unknown username or wrong password; which
    ///   of the two is never disclosed.
    pub fn login(&self, username: &str, password: &str) -> AuthResult<SessionToken> {
        let users = self.load_users()?;
        let matched = users
            .iter()
            .any(|user| user.username == username && user.password == password);

        if !matched {
            warn!("event=auth_login module=session status=rejected reason=invalid_credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let session = SessionToken {
            username: username.to_string(),
            token: Uuid::new_v4(),
        };
        let raw = serde_json::to_string(&session).map_err(StoreError::from)?;
        kv_put(self.conn, SESSION_KV_KEY, &raw)?;

        info!("event=auth_login module=session status=ok username={username}");
        Ok(session)
    }

    /// Removes the session marker. Logging out while logged out is a no-op.
    pub fn logout(&self) -> AuthResult<()> {
        kv_delete(self.conn, SESSION_KV_KEY)?;
        info!("event=auth_logout module=session status=ok");
        Ok(())
    }

    /// Returns the current session marker, if a user is logged in.
    ///
    /// A malformed stored marker is treated as logged out.
    pub fn current_session(&self) -> AuthResult<Option<SessionToken>> {
        let Some(raw) = kv_get(self.conn, SESSION_KV_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str::<SessionToken>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                warn!(
                    "event=session_load module=session status=recovered error_code=malformed_persisted_state error={err}"
                );
                Ok(None)
            }
        }
    }

    fn load_users(&self) -> AuthResult<Vec<CredentialRecord>> {
        let Some(raw) = kv_get(self.conn, USERS_KV_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<CredentialRecord>>(&raw) {
            Ok(users) => Ok(users),
            Err(err) => {
                warn!(
                    "event=users_load module=session status=recovered error_code=malformed_persisted_state error={err}"
                );
                Ok(Vec::new())
            }
        }
    }

    fn save_users(&self, users: &[CredentialRecord]) -> AuthResult<()> {
        let raw = serde_json::to_string(users).map_err(StoreError::from)?;
        kv_put(self.conn, USERS_KV_KEY, &raw)?;
        Ok(())
    }
}

fn normalize_username(username: &str) -> AuthResult<String> {
    let trimmed = username.trim();
    if !USERNAME_RE.is_match(trimmed) {
        return Err(AuthError::InvalidUsername(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}
