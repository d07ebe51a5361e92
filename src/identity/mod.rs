//! Outbound calls to the hosted identity service.

use std::fmt::Debug;

use {
    axum::async_trait,
    serde::{Deserialize, Serialize},
};

use crate::{model::Profile, Error};

mod supabase;

pub use supabase::SupabaseClient;

/// The canonical user record held by the identity service. Only its id is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Debug + Send + Sync {
    /// Verifies an email/password pair. `Ok(None)` means the service accepted the call
    /// but returned no user.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Identity>, Error>;

    /// Loads exactly one profile row by identity id.
    async fn fetch_profile(&self, id: &str) -> Result<Profile, Error>;
}
