//! Sign-in front end for the session store.
//!
//! There is no credential backend; [`LocalAuthenticator`] only performs the
//! input checks a login or registration form needs and hands back a demo
//! session. A real backend would implement [`Authenticator`] the same way.

use crate::{
    domain::{Identity, Role},
    error::{Result, TaskflowError},
};
use async_trait::async_trait;

/// Token issued by [`LocalAuthenticator`]
pub const DEMO_TOKEN: &str = "demo-jwt-token";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

/// An identity and token ready for `SessionStore::login`/`register`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: Identity,
    pub token: String,
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self, credentials: Credentials) -> Result<Session>;

    async fn register(&self, registration: Registration) -> Result<Session>;
}

/// Accepts any non-empty credentials
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalAuthenticator;

impl LocalAuthenticator {
    const LOCAL_USER_ID: &'static str = "1";
    const LOCAL_USER_NAME: &'static str = "Demo User";
}

#[async_trait]
impl Authenticator for LocalAuthenticator {
    async fn login(&self, credentials: Credentials) -> Result<Session> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(TaskflowError::InvalidCredentials);
        }

        Ok(Session {
            identity: Identity::new(
                Self::LOCAL_USER_ID,
                Self::LOCAL_USER_NAME,
                credentials.email,
                credentials.role,
            ),
            token: DEMO_TOKEN.to_string(),
        })
    }

    async fn register(&self, registration: Registration) -> Result<Session> {
        if registration.password != registration.confirm_password {
            return Err(TaskflowError::PasswordMismatch);
        }
        if registration.email.trim().is_empty() || registration.password.is_empty() {
            return Err(TaskflowError::InvalidCredentials);
        }

        Ok(Session {
            identity: Identity::new(
                Self::LOCAL_USER_ID,
                registration.name,
                registration.email,
                registration.role,
            ),
            token: DEMO_TOKEN.to_string(),
        })
    }
}
