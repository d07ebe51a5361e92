use {
    jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation},
    serde::{Deserialize, Serialize},
    time::{Duration, OffsetDateTime},
};

use crate::{model::Profile, util::SessionSecret, Error};

use super::{project_claims, Session, SessionUser};

/// Payload of the signed session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    #[serde(flatten)]
    pub user: SessionUser,
    pub iat: i64,
    pub exp: i64,
}

impl From<SessionClaims> for Session {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user: Some(claims.user),
            expires: OffsetDateTime::from_unix_timestamp(claims.exp).ok(),
        }
    }
}

/// Signs and verifies HS256 session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    max_age: Duration,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}

impl SessionKeys {
    pub fn new(secret: &SessionSecret, max_age: Duration) -> Self {
        let bytes = secret.secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation: Validation::new(Algorithm::HS256),
            max_age,
        }
    }

    pub const fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Materialises a session for a freshly authenticated profile and signs it.
    ///
    /// # Errors
    ///
    /// Returns an error if the expiry falls outside the representable date range
    /// or the claims cannot be encoded.
    pub fn issue(&self, profile: &Profile) -> Result<(String, Session), Error> {
        let now = OffsetDateTime::now_utc();
        let expires = now
            .checked_add(self.max_age)
            .ok_or(Error::SessionLifetime(self.max_age))?;

        let mut session = Session {
            user: Some(SessionUser::from_profile(profile)),
            expires: Some(expires),
        };
        project_claims(&mut session, profile);

        let claims = SessionClaims {
            sub: profile.id.clone(),
            user: session.user.clone().unwrap_or_default(),
            iat: now.unix_timestamp(),
            exp: expires.unix_timestamp(),
        };

        Ok((self.sign(&claims)?, session))
    }

    /// # Errors
    ///
    /// Returns an error if the claims cannot be encoded.
    pub fn sign(&self, claims: &SessionClaims) -> Result<String, Error> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    /// # Errors
    ///
    /// Returns an error if the token is malformed, has a bad signature, or has expired.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, Error> {
        Ok(decode::<SessionClaims>(token, &self.decoding, &self.validation)?.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(secret: &str) -> SessionKeys {
        SessionKeys::new(&SessionSecret::new(secret.into()), Duration::days(30))
    }

    fn profile() -> Profile {
        serde_json::from_str(r#"{"id": "u1", "role": "admin", "email": "ada@example.com"}"#)
            .unwrap()
    }

    #[test]
    fn issued_token_carries_projected_claims() {
        let keys = keys("top-secret");
        let (token, session) = keys.issue(&profile()).expect("token issued");

        let user = session.user.clone().expect("session has user");
        assert_eq!(user.id.as_deref(), Some("u1"));
        assert_eq!(user.role.as_deref(), Some("admin"));

        let claims = keys.verify(&token).expect("token verifies");
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.user, user);
        assert_eq!(claims.exp - claims.iat, Duration::days(30).whole_seconds());

        let restored = Session::from(claims);
        assert_eq!(restored.user, session.user);
        assert_eq!(
            restored.expires.map(OffsetDateTime::unix_timestamp),
            session.expires.map(OffsetDateTime::unix_timestamp)
        );
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let (token, _) = keys("one").issue(&profile()).unwrap();
        assert!(matches!(keys("two").verify(&token), Err(Error::SessionToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = keys("top-secret");
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = SessionClaims {
            sub: "u1".into(),
            user: SessionUser::builder().id("u1").role("admin").build(),
            iat: now - 7200,
            exp: now - 3600,
        };

        let token = keys.sign(&claims).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn lifetime_past_representable_dates_is_an_error() {
        let keys = SessionKeys::new(
            &SessionSecret::new("top-secret".into()),
            Duration::days(10_000_000),
        );
        assert!(matches!(
            keys.issue(&profile()),
            Err(Error::SessionLifetime(_))
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(keys("top-secret").verify("not.a.jwt").is_err());
    }

    #[test]
    fn debug_does_not_leak_key_material() {
        let rendered = format!("{:?}", keys("top-secret"));
        assert!(!rendered.contains("top-secret"));
    }
}
