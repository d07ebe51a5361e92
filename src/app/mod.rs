use std::sync::Arc;

use axum::Router;

use crate::{credentials::backend::Backend, session::SessionKeys, Config};

mod builder;
pub mod middleware;

pub use builder::Builder;

pub type AppRouter = Router<Arc<Context>>;

/// Shared, immutable state handed to every handler.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub backend: Backend,
    pub keys: SessionKeys,
}
