mod config;
mod secret;

pub use config::{
    Config, IdentityConfig, LoggerConfig, RequiredEnv, Routes, SameSiteConfig, SessionConfig,
    Verbosity, WebsiteConfig,
};
pub use secret::{ServiceRoleKey, SessionSecret};
