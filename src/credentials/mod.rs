use std::fmt;

use {serde::Deserialize, thiserror::Error};

pub mod backend;

/// The single failure code surfaced to the end user for any rejected sign-in.
pub const CREDENTIALS_SIGNIN_ERROR: &str = "CredentialsSignin";

#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Why a sign-in attempt did not produce a profile.
///
/// Callers of the authentication backend only ever see "no user"; this type keeps
/// the distinction for logs and for code that wants to inspect it.
#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("email or password missing")]
    MissingCredentials,

    #[error("identity service rejected the credentials: {0}")]
    Rejected(#[source] crate::Error),

    #[error("identity service returned no user")]
    NoIdentity,

    #[error("profile lookup failed for {id}: {source}")]
    ProfileLookup {
        id: String,
        #[source]
        source: crate::Error,
    },
}
