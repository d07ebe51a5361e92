use std::{convert::Infallible, sync::Arc};

use {
    axum::{
        async_trait,
        extract::FromRequestParts,
        http::{header::AUTHORIZATION, request::Parts},
    },
    axum_extra::extract::cookie::{Cookie, CookieJar, SameSite},
    tracing::debug,
};

use crate::{
    app::Context,
    session::Session,
    util::{SameSiteConfig, SessionConfig},
};

impl From<SameSiteConfig> for SameSite {
    fn from(policy: SameSiteConfig) -> Self {
        match policy {
            SameSiteConfig::Strict => Self::Strict,
            SameSiteConfig::Lax => Self::Lax,
            SameSiteConfig::None => Self::None,
        }
    }
}

pub fn session_cookie(config: &SessionConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token))
        .http_only(true)
        .secure(config.secure)
        .same_site(config.same_site_policy.into())
        .path("/")
        .max_age(config.max_age())
        .build()
}

pub fn clear_session_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(ToString::to_string)
}

/// Reads the session from the session cookie, falling back to a bearer token.
///
/// A missing, expired, or forged token yields an anonymous session.
#[async_trait]
impl FromRequestParts<Arc<Context>> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<Context>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(&state.config.session.cookie_name)
            .map(|cookie| cookie.value().to_string())
            .or_else(|| bearer_token(parts));

        let Some(token) = token else {
            return Ok(Self::default());
        };

        match state.keys.verify(&token) {
            Ok(claims) => Ok(claims.into()),
            Err(err) => {
                debug!(err = %err, "Ignoring invalid session token");
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes_follow_config() {
        let config = SessionConfig {
            secure: true,
            same_site_policy: SameSiteConfig::Strict,
            ..SessionConfig::default()
        };

        let cookie = session_cookie(&config, "token-value".into());
        assert_eq!(cookie.name(), "session-token");
        assert_eq!(cookie.value(), "token-value");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(30)));
    }

    #[test]
    fn cleared_cookie_expires_immediately() {
        let cookie = clear_session_cookie(&SessionConfig::default());
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
