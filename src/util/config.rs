#![allow(clippy::module_name_repetitions)]

use std::{path::Path, time::Duration};

use {
    config::{ConfigError, Environment, File},
    derivative::Derivative,
    serde::{Deserialize, Serialize},
    strum::Display,
    tracing::level_filters::LevelFilter,
    url::Url,
};

use crate::Error;

use super::{ServiceRoleKey, SessionSecret};

pub const SUPABASE_URL: &str = "SUPABASE_URL";
pub const SUPABASE_SERVICE_ROLE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";
pub const NEXTAUTH_SECRET: &str = "NEXTAUTH_SECRET";

const ENV_PREFIX: &str = "APP";

/// Upper bound on `session.max_age_days`.
pub const MAX_SESSION_AGE_DAYS: i64 = 3650;

#[derive(
    Default, Display, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq,
)]
pub enum Verbosity {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<Verbosity> for LevelFilter {
    fn from(verbosity: Verbosity) -> Self {
        match verbosity {
            Verbosity::Trace => Self::TRACE,
            Verbosity::Debug => Self::DEBUG,
            Verbosity::Info => Self::INFO,
            Verbosity::Warn => Self::WARN,
            Verbosity::Error => Self::ERROR,
        }
    }
}

#[derive(Default, Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggerConfig {
    pub verbosity: Verbosity,
}

#[derive(Debug, Serialize, Deserialize, Derivative, Clone)]
#[derivative(Default)]
#[serde(default)]
pub struct WebsiteConfig {
    #[derivative(Default(value = "\"127.0.0.1\".into()"))]
    pub bind_address: String,
    #[derivative(Default(value = "3000"))]
    pub bind_port: u16,
}

impl WebsiteConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

#[derive(
    Default, Display, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SameSiteConfig {
    Strict,
    #[default]
    Lax,
    None,
}

#[derive(Debug, Serialize, Deserialize, Derivative, Clone)]
#[derivative(Default)]
#[serde(default)]
pub struct SessionConfig {
    #[derivative(Default(value = "\"session-token\".into()"))]
    pub cookie_name: String,
    #[derivative(Default(value = "30"))]
    pub max_age_days: i64,
    pub same_site_policy: SameSiteConfig,
    pub secure: bool,
}

impl SessionConfig {
    pub const fn max_age(&self) -> time::Duration {
        time::Duration::seconds(self.max_age_days.saturating_mul(86_400))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_SESSION_AGE_DAYS).contains(&self.max_age_days) {
            return Err(ConfigError::Message(format!(
                "session.max_age_days must be between 1 and {MAX_SESSION_AGE_DAYS}, got {}",
                self.max_age_days
            )));
        }

        if self.same_site_policy == SameSiteConfig::None && !self.secure {
            return Err(ConfigError::Message(format!(
                "session.same_site_policy = \"{}\" requires session.secure = true",
                self.same_site_policy
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Derivative, Clone)]
#[derivative(Default)]
#[serde(default)]
pub struct IdentityConfig {
    #[derivative(Default(value = "\"users\".into()"))]
    pub profile_table: String,
    #[derivative(Default(value = "10"))]
    pub timeout_secs: u64,
}

impl IdentityConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Serialize, Deserialize, Derivative, Clone)]
#[derivative(Default)]
#[serde(default)]
pub struct Routes {
    #[derivative(Default(value = "\"/\".into()"))]
    pub root: String,
    #[derivative(Default(value = "String::new()"))]
    pub public_home: String,
    #[derivative(Default(value = "\"login\".into()"))]
    pub public_login: String,
    #[derivative(Default(value = "\"logout\".into()"))]
    pub public_logout: String,
    #[derivative(Default(value = "\"api/auth/session\".into()"))]
    pub session: String,
    #[derivative(Default(value = "\"protected\".into()"))]
    pub protected_home: String,
}

impl Routes {
    /// Returns a new `Routes` struct with the `root` path prepended to all paths.
    pub fn with_root(&self) -> Self {
        let normalized_base = normalize_slash(&self.root);
        Self {
            root: normalized_base.clone(),
            public_home: join_paths(&normalized_base, &self.public_home),
            public_login: join_paths(&normalized_base, &self.public_login),
            public_logout: join_paths(&normalized_base, &self.public_logout),
            session: join_paths(&normalized_base, &self.session),
            protected_home: join_paths(&normalized_base, &self.protected_home),
        }
    }
}

fn normalize_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

fn join_paths(base: &str, path: &str) -> String {
    let trimmed_base = base.trim_end_matches('/');
    let trimmed_path = path.trim_start_matches('/');
    format!("{trimmed_base}/{trimmed_path}")
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub website: WebsiteConfig,
    pub logger: LoggerConfig,
    pub session: SessionConfig,
    pub routes: Routes,
    pub identity: IdentityConfig,
}

impl Config {
    /// Loads `config/default.toml`, then `config/local.toml`, then `APP__*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file or override cannot be parsed.
    pub fn load() -> Result<Self, Error> {
        Self::load_from_dir("config")
    }

    /// # Errors
    ///
    /// Returns an error if a present file or override cannot be parsed, or holds
    /// out-of-range session settings.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self, Error> {
        let dir = dir.as_ref();
        let settings = config::Config::builder()
            .add_source(File::from(dir.join("default.toml")).required(false))
            .add_source(File::from(dir.join("local.toml")).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if a setting is outside the range the service can honour.
    pub fn validate(&self) -> Result<(), Error> {
        self.session.validate()?;
        Ok(())
    }
}

/// The three values the service refuses to start without.
#[derive(Debug, Clone)]
pub struct RequiredEnv {
    pub supabase_url: Url,
    pub service_role_key: ServiceRoleKey,
    pub session_secret: SessionSecret,
}

impl RequiredEnv {
    /// # Errors
    ///
    /// Returns an error if any required variable is unset, empty, or the URL does not parse.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// # Errors
    ///
    /// Returns an error if any required variable is unset, empty, or the URL does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(Error::MissingEnvironment(key))
        };

        let supabase_url = require(SUPABASE_URL)?;
        let service_role_key = require(SUPABASE_SERVICE_ROLE_KEY)?;
        let session_secret = require(NEXTAUTH_SECRET)?;

        Ok(Self {
            supabase_url: Url::parse(&supabase_url)?,
            service_role_key: ServiceRoleKey::new(service_role_key),
            session_secret: SessionSecret::new(session_secret),
        })
    }
}
