//! HTTP providers for forecast and activity data.
//!
//! Providers only fetch and decode. Results are applied to the store by the
//! caller, and only after a provider call has fully succeeded.

pub mod openmeteo;
pub mod strava;

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0} rejected the credentials")]
    Unauthorized(&'static str),

    #[error("{provider} returned HTTP {status}")]
    Status {
        provider: &'static str,
        status: StatusCode,
    },

    #[error("Malformed {provider} response: {message}")]
    Malformed {
        provider: &'static str,
        message: String,
    },

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

impl From<ProviderError> for taper_core::Error {
    fn from(err: ProviderError) -> Self {
        taper_core::Error::Provider(err.to_string())
    }
}

/// Map a non-success status to a provider error
fn check_status(provider: &'static str, status: StatusCode) -> Result<(), ProviderError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(ProviderError::Unauthorized(provider))
    } else if !status.is_success() {
        Err(ProviderError::Status { provider, status })
    } else {
        Ok(())
    }
}
