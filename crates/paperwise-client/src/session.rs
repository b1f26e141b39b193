//! Session persistence and the session context.
//!
//! [`SessionStore`] is the thin durable layer: token and user profile as two
//! independent entries. [`SessionContext`] sits on top and is the only thing
//! allowed to change the session, keeping token and user in lockstep.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::types::null_as_default;
use crate::error::Result;
use crate::storage::KeyValueStore;

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

/// Headers attached to authenticated requests.
pub type AuthHeaders = HashMap<String, String>;

/// Profile of the signed-in user as returned by the backend.
///
/// The backend may send its record id as `_id`, `id` or both; `id` wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "UserRecord")]
pub struct User {
    pub id: String,

    pub name: String,

    pub email: String,

    /// Any additional profile fields, kept so the profile round-trips intact.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct UserRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    id: String,

    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    record_id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    email: String,

    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        let id = if record.id.is_empty() {
            record.record_id
        } else {
            record.id
        };
        Self {
            id,
            name: record.name,
            email: record.email,
            extra: record.extra,
        }
    }
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// An authenticated identity: bearer token plus the profile it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Durable storage of the session token and user profile.
#[derive(Debug, Clone)]
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn save_token(&self, token: &str) -> Result<()> {
        self.store.set(TOKEN_KEY, token)
    }

    pub fn token(&self) -> Result<Option<String>> {
        self.store.get(TOKEN_KEY)
    }

    pub fn remove_token(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)
    }

    pub fn save_user(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.store.set(USER_KEY, &json)
    }

    /// Stored user profile. An entry that no longer parses reads as absent.
    pub fn user(&self) -> Result<Option<User>> {
        let Some(raw) = self.store.get(USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!(error = %e, "Stored user profile is not valid JSON");
                Ok(None)
            }
        }
    }

    pub fn remove_user(&self) -> Result<()> {
        self.store.remove(USER_KEY)
    }

    /// `Authorization: Bearer <token>` when a token is stored, empty otherwise.
    pub fn auth_headers(&self) -> Result<AuthHeaders> {
        let mut headers = AuthHeaders::new();
        if let Some(token) = self.token()? {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        Ok(headers)
    }

    /// The underlying key-value store.
    pub fn inner(&self) -> &S {
        &self.store
    }
}

/// Holder of the current session for the lifetime of the client.
///
/// Initial state is probed from durable storage. Both transitions write
/// through to storage before touching the in-memory copy, so a context
/// restored right after a transition observes it.
#[derive(Debug)]
pub struct SessionContext<S> {
    store: SessionStore<S>,
    session: Option<Session>,
}

impl<S: KeyValueStore> SessionContext<S> {
    /// Build the context from whatever session durable storage holds.
    ///
    /// A token without a user (or the reverse) is treated as signed-out and
    /// the orphaned entry is cleared.
    pub fn restore(store: S) -> Result<Self> {
        let store = SessionStore::new(store);
        let session = match (store.token()?, store.user()?) {
            (Some(token), Some(user)) => Some(Session { token, user }),
            (None, None) => None,
            (token, _) => {
                tracing::warn!(
                    has_token = token.is_some(),
                    "Discarding partial session from storage"
                );
                store.remove_token()?;
                store.remove_user()?;
                None
            }
        };

        if let Some(session) = &session {
            tracing::debug!(user = %session.user.email, "Restored session");
        }

        Ok(Self { store, session })
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// Replace the current session (if any) with a new one.
    pub fn sign_in(&mut self, token: impl Into<String>, user: User) -> Result<()> {
        let token = token.into();
        self.store.save_token(&token)?;
        if let Err(e) = self.store.save_user(&user) {
            // The new token must not pair with the previous user's profile
            tracing::warn!(error = %e, "Could not save user; dropping session");
            self.session = None;
            self.store.remove_token()?;
            return Err(e);
        }
        tracing::debug!(user = %user.email, "Signed in");
        self.session = Some(Session { token, user });
        Ok(())
    }

    /// Drop the session. Safe to call when already signed out.
    pub fn sign_out(&mut self) -> Result<()> {
        self.store.remove_token()?;
        self.store.remove_user()?;
        if self.session.take().is_some() {
            tracing::debug!("Signed out");
        }
        Ok(())
    }

    /// Headers for an authenticated request, read from durable storage.
    pub fn auth_headers(&self) -> Result<AuthHeaders> {
        self.store.auth_headers()
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }
}
