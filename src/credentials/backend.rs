use std::sync::Arc;

use {
    axum::async_trait,
    axum_login::{AuthnBackend, UserId},
    tracing::{debug, warn},
};

use crate::{identity::IdentityProvider, model::Profile, Error};

use super::{AuthFailure, Credentials};

/// Credential authenticator: checks an email/password pair with the identity
/// service and resolves the matching profile row.
#[derive(Debug, Clone)]
pub struct Backend {
    identity: Arc<dyn IdentityProvider>,
}

impl Backend {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }

    /// Runs the sign-in and keeps the reason for any failure.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthFailure`] describing which step stopped the sign-in.
    pub async fn verify(&self, creds: &Credentials) -> Result<Profile, AuthFailure> {
        if !creds.is_complete() {
            return Err(AuthFailure::MissingCredentials);
        }

        let identity = self
            .identity
            .sign_in_with_password(&creds.email, &creds.password)
            .await
            .map_err(AuthFailure::Rejected)?
            .ok_or(AuthFailure::NoIdentity)?;

        debug!(id = %identity.id, "Identity verified, loading profile");

        self.identity
            .fetch_profile(&identity.id)
            .await
            .map_err(|source| AuthFailure::ProfileLookup {
                id: identity.id,
                source,
            })
    }
}

#[async_trait]
impl AuthnBackend for Backend {
    type User = Profile;
    type Credentials = Credentials;
    type Error = Error;

    async fn authenticate(
        &self,
        creds: Self::Credentials,
    ) -> Result<Option<Self::User>, Self::Error> {
        match self.verify(&creds).await {
            Ok(profile) => Ok(Some(profile)),
            Err(failure) => {
                warn!(email = %creds.email, reason = %failure, "Credentials sign-in failed");
                Ok(None)
            }
        }
    }

    async fn get_user(&self, user_id: &UserId<Self>) -> Result<Option<Self::User>, Self::Error> {
        match self.identity.fetch_profile(user_id).await {
            Ok(profile) => Ok(Some(profile)),
            Err(err) if err.is_no_rows() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::identity::fake::FakeIdentityService;

    use super::*;

    fn backend(service: &Arc<FakeIdentityService>) -> Backend {
        Backend::new(service.clone())
    }

    fn seeded() -> FakeIdentityService {
        FakeIdentityService::default()
            .with_account("u1", "admin@example.com", "correct horse")
            .with_profile("u1", Some("admin"))
            .with_account("u2", "orphan@example.com", "battery staple")
    }

    #[tokio::test]
    async fn empty_fields_short_circuit_without_calls() {
        let service = Arc::new(seeded());
        let backend = backend(&service);

        for creds in [
            Credentials::new("", "correct horse"),
            Credentials::new("admin@example.com", ""),
            Credentials::default(),
        ] {
            let result = backend.authenticate(creds).await.expect("never errors");
            assert!(result.is_none());
        }

        assert_eq!(service.calls(), 0);
        assert!(matches!(
            backend.verify(&Credentials::default()).await,
            Err(AuthFailure::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn valid_credentials_resolve_profile() {
        let service = Arc::new(seeded());
        let profile = backend(&service)
            .authenticate(Credentials::new("admin@example.com", "correct horse"))
            .await
            .expect("never errors")
            .expect("profile resolved");

        assert_eq!(profile.id, "u1");
        assert_eq!(profile.role.as_deref(), Some("admin"));
        assert_eq!(service.calls(), 2);
    }

    #[tokio::test]
    async fn missing_profile_row_is_absence() {
        let service = Arc::new(seeded());
        let backend = backend(&service);
        let creds = Credentials::new("orphan@example.com", "battery staple");

        assert!(backend.authenticate(creds.clone()).await.unwrap().is_none());
        assert!(matches!(
            backend.verify(&creds).await,
            Err(AuthFailure::ProfileLookup { ref id, .. }) if id == "u2"
        ));
    }

    #[tokio::test]
    async fn wrong_password_is_absence_without_profile_lookup() {
        let service = Arc::new(seeded());
        let backend = backend(&service);
        let creds = Credentials::new("admin@example.com", "wrong");

        assert!(backend.authenticate(creds.clone()).await.unwrap().is_none());
        assert!(matches!(
            backend.verify(&creds).await,
            Err(AuthFailure::Rejected(_))
        ));
        assert_eq!(
            service
                .profile_calls
                .load(std::sync::atomic::Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn unavailable_service_is_absence() {
        let service = Arc::new(FakeIdentityService {
            unavailable: true,
            ..seeded()
        });

        let result = backend(&service)
            .authenticate(Credentials::new("admin@example.com", "correct horse"))
            .await
            .expect("never errors");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn get_user_distinguishes_missing_rows() {
        let service = Arc::new(seeded());
        let backend = backend(&service);

        let found = backend.get_user(&"u1".to_string()).await.unwrap();
        assert_eq!(found.map(|p| p.id).as_deref(), Some("u1"));

        let missing = backend.get_user(&"nobody".to_string()).await.unwrap();
        assert!(missing.is_none());
    }
}
