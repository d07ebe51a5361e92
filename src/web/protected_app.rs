use std::sync::Arc;

use {
    axum::{
        extract::{OriginalUri, Request, State},
        http::{StatusCode, Uri},
        middleware::{from_fn_with_state, Next},
        response::{IntoResponse, Redirect, Response},
    },
    axum_login::url_with_redirect_query,
    tracing::{debug, error, info},
};

use crate::{
    app::{AppRouter, Context},
    session::Session,
    util::Routes,
    web::router::{create_login_route, logout, protected, session},
};

pub struct ProtectedApp {
    app_ctx: Arc<Context>,
    protected_router: Option<AppRouter>,
    routes: Routes,
}

impl ProtectedApp {
    pub fn new(app_ctx: &Arc<Context>, protected_router: Option<AppRouter>) -> Self {
        Self {
            app_ctx: app_ctx.clone(),
            protected_router,
            routes: app_ctx.config.routes.with_root(),
        }
    }

    pub fn create_auth_router(self) -> AppRouter {
        debug!("Creating auth router");

        let router = if let Some(router) = self.protected_router {
            debug!("Using provided protected_router");
            router
        } else {
            debug!(
                "No protected_router provided, using default protected::router() at route: {}",
                self.routes.protected_home
            );
            protected::router(&self.routes.protected_home)
        };

        let auth_middleware = from_fn_with_state(self.app_ctx, require_session);
        info!("Auth middleware created");

        router
            .route_layer(auth_middleware)
            .merge(create_login_route(&self.routes.public_login))
            .merge(logout::router(&self.routes.public_logout))
            .merge(session::router(&self.routes.session))
    }
}

async fn require_session(
    State(app_ctx): State<Arc<Context>>,
    session: Session,
    OriginalUri(original_uri): OriginalUri,
    req: Request,
    next: Next,
) -> Response {
    if session.is_authenticated() {
        debug!("Authenticated user in session, continuing");
        next.run(req).await
    } else {
        debug!("User not authenticated, redirecting to login");
        let login_url = app_ctx.config.routes.with_root().public_login;
        redirect_to_login(&login_url, &original_uri)
    }
}

fn redirect_to_login(login_url: &str, original_uri: &Uri) -> Response {
    match url_with_redirect_query(login_url, "next", original_uri.clone()) {
        Ok(login_url) => {
            debug!(
                "Redirecting to login url: {} with next param {:?}",
                login_url, original_uri
            );
            Redirect::temporary(&login_url.to_string()).into_response()
        }
        Err(err) => {
            error!(err = %err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
