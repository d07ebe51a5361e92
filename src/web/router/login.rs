use {
    askama::Template,
    axum::{
        routing::{get, post},
        Router,
    },
    serde::Deserialize,
    url::{form_urlencoded, Url},
};

use crate::{app::AppRouter, credentials::CREDENTIALS_SIGNIN_ERROR};

#[derive(Template)]
#[template(path = "login.html")]
pub struct Login {
    pub message: Option<String>,
    pub next: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

const SAME_ORIGIN_BASE: &str = "http://localhost";

pub fn router(login_page: &str) -> AppRouter {
    Router::new()
        .route(login_page, post(self::post::login))
        .route(login_page, get(self::get::login))
}

/// Only same-origin paths are followed after sign-in.
fn safe_next(next: Option<&str>, fallback: &str) -> String {
    next.filter(|next| is_same_origin_path(next))
        .unwrap_or(fallback)
        .to_string()
}

fn is_same_origin_path(next: &str) -> bool {
    let mut chars = next.chars();
    if chars.next() != Some('/') || matches!(chars.next(), Some('/' | '\\')) {
        return false;
    }
    if next.chars().any(char::is_control) {
        return false;
    }

    let Ok(base) = Url::parse(SAME_ORIGIN_BASE) else {
        return false;
    };
    base.join(next)
        .is_ok_and(|joined| joined.origin() == base.origin())
}

fn login_failure_url(login_page: &str, next: Option<&str>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("error", CREDENTIALS_SIGNIN_ERROR);
    if let Some(next) = next.filter(|next| !next.is_empty()) {
        query.append_pair("next", next);
    }
    format!("{login_page}?{}", query.finish())
}

mod post {

    use std::sync::Arc;

    use {
        axum::{
            extract::State,
            response::{IntoResponse, Redirect},
            Form,
        },
        axum_extra::extract::cookie::CookieJar,
        axum_login::AuthnBackend,
        tracing::{debug, error},
    };

    use crate::{
        app::{middleware::session::session_cookie, Context},
        credentials::Credentials,
        Error,
    };

    use super::{login_failure_url, safe_next, LoginForm};

    pub async fn login(
        State(app_ctx): State<Arc<Context>>,
        jar: CookieJar,
        Form(LoginForm {
            email,
            password,
            next,
        }): Form<LoginForm>,
    ) -> Result<impl IntoResponse, Error> {
        let routes = app_ctx.config.routes.with_root();
        let creds = Credentials { email, password };

        let profile = match app_ctx.backend.authenticate(creds).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                debug!("Sign-in rejected, returning to login page");
                let url = login_failure_url(&routes.public_login, next.as_deref());
                return Ok((jar, Redirect::to(&url)));
            }
            Err(err) => {
                error!("Internal error during authentication: {:?}", err);
                let url = login_failure_url(&routes.public_login, next.as_deref());
                return Ok((jar, Redirect::to(&url)));
            }
        };

        let (token, _) = app_ctx.keys.issue(&profile)?;
        debug!(id = %profile.id, "Session issued");

        let jar = jar.add(session_cookie(&app_ctx.config.session, token));
        let target = safe_next(next.as_deref(), &routes.public_home);
        Ok((jar, Redirect::to(&target)))
    }
}

mod get {

    use axum::extract::Query;

    use crate::credentials::CREDENTIALS_SIGNIN_ERROR;

    use super::{Login, LoginQuery};

    pub async fn login(Query(LoginQuery { next, error }): Query<LoginQuery>) -> Login {
        let message = error.map(|code| {
            if code == CREDENTIALS_SIGNIN_ERROR {
                "Sign in failed. Check the details you provided are correct.".to_string()
            } else {
                "Unable to sign in.".to_string()
            }
        });

        Login {
            message,
            next: next.unwrap_or_default(),
        }
    }
}
