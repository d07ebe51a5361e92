use axum::{routing::get, Router};

use crate::app::AppRouter;

pub fn router(logout_page: &str) -> AppRouter {
    Router::new().route(logout_page, get(self::get::logout).post(self::get::logout))
}

mod get {

    use std::sync::Arc;

    use {
        axum::{
            extract::State,
            response::{IntoResponse, Redirect},
        },
        axum_extra::extract::cookie::CookieJar,
        tracing::debug,
    };

    use crate::app::{middleware::session::clear_session_cookie, Context};

    pub async fn logout(State(app_ctx): State<Arc<Context>>, jar: CookieJar) -> impl IntoResponse {
        debug!("Clearing session cookie");
        let jar = jar.add(clear_session_cookie(&app_ctx.config.session));
        (jar, Redirect::to(&app_ctx.config.routes.with_root().root))
    }
}
