use {
    askama::Template,
    axum::{routing::get, Router},
};

use crate::app::AppRouter;

#[derive(Template)]
#[template(path = "protected.html")]
struct ProtectedTemplate<'a> {
    id: &'a str,
    role: &'a str,
}

pub fn router(protected_home: &str) -> AppRouter {
    Router::new().route(protected_home, get(self::get::protected))
}

mod get {

    use axum::{http::StatusCode, response::IntoResponse};

    use crate::session::Session;

    use super::ProtectedTemplate;

    pub async fn protected(session: Session) -> impl IntoResponse {
        match session.user {
            Some(user) => ProtectedTemplate {
                id: user.id.as_deref().unwrap_or_default(),
                role: user.role.as_deref().unwrap_or("none"),
            }
            .into_response(),

            None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}
