use std::sync::Arc;

use {tower_http::trace::TraceLayer, tracing::debug};

use crate::{
    credentials::backend::Backend,
    identity::{IdentityProvider, SupabaseClient},
    session::SessionKeys,
    util::{RequiredEnv, SessionSecret},
    web::ProtectedApp,
    Config, Error,
};

use super::{AppRouter, Context};

type RouterFactory = dyn FnOnce(&Arc<Context>) -> AppRouter + Send + 'static;

pub struct Builder {
    app_ctx: Arc<Context>,
    protected_router_factory: Option<Box<RouterFactory>>,
    unprotected_router_factory: Option<Box<RouterFactory>>,
}

impl Builder {
    /// Wires the credentials backend to the hosted identity service.
    ///
    /// # Errors
    ///
    /// This function will return an error if the identity service client cannot be built.
    pub fn new(config: Config, env: &RequiredEnv) -> Result<Self, Error> {
        let client = SupabaseClient::new(env, &config.identity)?;
        Ok(Self::with_identity_provider(
            config,
            &env.session_secret,
            Arc::new(client),
        ))
    }

    /// Reads the required environment and builds against the hosted identity service.
    ///
    /// # Errors
    ///
    /// This function will return an error if any required environment value is missing.
    pub fn from_env(config: Config) -> Result<Self, Error> {
        let env = RequiredEnv::from_env()?;
        Self::new(config, &env)
    }

    pub fn with_identity_provider(
        config: Config,
        session_secret: &SessionSecret,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        debug!("Initializing Builder with config: {:?}", config);

        let keys = SessionKeys::new(session_secret, config.session.max_age());
        let app_ctx = Arc::new(Context {
            config,
            backend: Backend::new(identity),
            keys,
        });

        Self {
            app_ctx,
            protected_router_factory: None,
            unprotected_router_factory: None,
        }
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.app_ctx
    }

    #[must_use]
    pub fn with_unprotected_router<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(&Arc<Context>) -> AppRouter + Send + 'static,
    {
        self.unprotected_router_factory = Some(Box::new(factory));
        self
    }

    #[must_use]
    pub fn with_protected_router<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(&Arc<Context>) -> AppRouter + Send + 'static,
    {
        self.protected_router_factory = Some(Box::new(factory));
        self
    }

    /// Build the router. Uses the default protected page if no protected router was provided.
    pub fn build(self) -> axum::Router {
        let app_ctx = self.app_ctx;

        let optional_protected_router = self
            .protected_router_factory
            .map(|factory| factory(&app_ctx));

        let unprotected_router = self
            .unprotected_router_factory
            .map(|factory| factory(&app_ctx));

        let app = ProtectedApp::new(&app_ctx, optional_protected_router);
        let auth_router = app.create_auth_router();

        let router = if let Some(unprotected_router) = unprotected_router {
            auth_router.merge(unprotected_router)
        } else {
            auth_router
        };

        router
            .layer(TraceLayer::new_for_http())
            .with_state(app_ctx)
    }
}
