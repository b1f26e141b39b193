//! Sign-in and sign-up forms.

use crate::api::{ApiClient, SignInRequest, SignUpRequest};
use crate::error::Result;
use crate::session::SessionContext;
use crate::storage::KeyValueStore;

use super::failure_message;

pub const SIGNIN_FAILED: &str = "Signin failed";
pub const SIGNUP_FAILED: &str = "Signup failed";

#[derive(Debug, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
    error: Option<String>,
}

impl SignInForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            error: None,
        }
    }

    /// Submit the credentials and start a session on success.
    ///
    /// `Ok(false)` means the backend refused or could not be reached; the
    /// reason is in [`Self::error`]. `Err` is reserved for local storage
    /// failures while saving the new session.
    pub async fn submit<S: KeyValueStore>(
        &mut self,
        session: &mut SessionContext<S>,
        api: &ApiClient,
    ) -> Result<bool> {
        self.error = None;
        let request = SignInRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        };
        match api.sign_in(&request).await {
            Ok(auth) => {
                session.sign_in(auth.token, auth.user)?;
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(email = %self.email, error = %e, "Sign-in failed");
                self.error = Some(failure_message(&e, SIGNIN_FAILED));
                Ok(false)
            }
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[derive(Debug, Default)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    error: Option<String>,
}

impl SignUpForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            error: None,
        }
    }

    /// Create the account; a successful sign-up is also a sign-in.
    pub async fn submit<S: KeyValueStore>(
        &mut self,
        session: &mut SessionContext<S>,
        api: &ApiClient,
    ) -> Result<bool> {
        self.error = None;
        let request = SignUpRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        };
        match api.sign_up(&request).await {
            Ok(auth) => {
                session.sign_in(auth.token, auth.user)?;
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(email = %self.email, error = %e, "Sign-up failed");
                self.error = Some(failure_message(&e, SIGNUP_FAILED));
                Ok(false)
            }
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
