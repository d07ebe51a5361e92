#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod app;
pub mod credentials;
mod error;
pub mod identity;
pub mod model;
pub mod session;
mod util;
mod web;

pub use {
    app::{AppRouter, Builder, Context},
    error::Error,
    util::{
        Config, IdentityConfig, LoggerConfig, RequiredEnv, Routes, SameSiteConfig, ServiceRoleKey,
        SessionConfig, SessionSecret, Verbosity, WebsiteConfig,
    },
};
