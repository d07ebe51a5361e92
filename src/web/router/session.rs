use axum::{routing::get, Router};

use crate::app::AppRouter;

pub fn router(session_path: &str) -> AppRouter {
    Router::new().route(session_path, get(self::get::session))
}

mod get {

    use axum::Json;

    use crate::session::Session;

    pub async fn session(session: Session) -> Json<Session> {
        Json(session)
    }
}
