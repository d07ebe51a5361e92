use std::io;

use {
    axum::{
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    thiserror::Error,
    tracing::error,
    url::ParseError,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("Missing required environment variable: {0}")]
    MissingEnvironment(&'static str),

    #[error("Cannot parse URL")]
    ParseError(#[from] ParseError),

    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Identity service responded {status}: {message}")]
    IdentityService { status: u16, message: String },

    #[error("Session lifetime {0} puts the expiry out of range")]
    SessionLifetime(time::Duration),

    #[error("Session token error: {0}")]
    SessionToken(#[from] jsonwebtoken::errors::Error),
}

impl Error {
    /// True when the identity service reported that a single-row query matched nothing.
    pub const fn is_no_rows(&self) -> bool {
        matches!(
            self,
            Self::IdentityService {
                status: 404 | 406,
                ..
            }
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::SessionToken(_) | Self::SessionLifetime(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to issue session token".to_string(),
            ),
            Self::IdentityService { .. } | Self::Reqwest(_) => (
                StatusCode::BAD_GATEWAY,
                "Identity service unavailable".to_string(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            ),
        };

        error!(err = %self, "Request failed");

        (status, format!("{status}: {error_message}")).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_rows_covers_postgrest_single_object_status() {
        let err = Error::IdentityService {
            status: 406,
            message: "JSON object requested, multiple (or no) rows returned".into(),
        };
        assert!(err.is_no_rows());

        let err = Error::IdentityService {
            status: 500,
            message: "boom".into(),
        };
        assert!(!err.is_no_rows());
    }

    #[test]
    fn identity_errors_map_to_bad_gateway() {
        let response = Error::IdentityService {
            status: 503,
            message: "down".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = Error::MissingEnvironment("SUPABASE_URL").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
