//! Strava activity feed provider.

use super::{check_status, ProviderError};
use reqwest::Client;
use serde::Deserialize;
use taper_core::config::StravaConfig;
use taper_core::import::Activity;

pub const STRAVA_API_BASE: &str = "https://www.strava.com/api/v3";
/// Activities requested per sync
pub const ACTIVITIES_PER_PAGE: u32 = 30;
const PROVIDER: &str = "Strava";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchange the configured refresh token for a fresh access token
pub async fn refresh_access_token(
    base_url: &str,
    config: &StravaConfig,
) -> Result<String, ProviderError> {
    let (Some(client_id), Some(client_secret), Some(refresh_token)) = (
        config.client_id.as_deref(),
        config.client_secret.as_deref(),
        config.refresh_token.as_deref(),
    ) else {
        return Err(ProviderError::MissingCredentials(
            "client_id, client_secret and refresh_token are all required".into(),
        ));
    };

    let url = format!("{}/oauth/token", base_url.trim_end_matches('/'));
    let response = Client::new()
        .post(&url)
        .form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .send()
        .await?;

    check_status(PROVIDER, response.status())?;

    let token: TokenResponse = response.json().await.map_err(|e| ProviderError::Malformed {
        provider: PROVIDER,
        message: e.to_string(),
    })?;
    tracing::debug!("Refreshed Strava access token");
    Ok(token.access_token)
}

/// Fetch the most recent activities for the authenticated athlete
pub async fn fetch_activities(
    base_url: &str,
    access_token: &str,
    per_page: u32,
) -> Result<Vec<Activity>, ProviderError> {
    let url = format!("{}/athlete/activities", base_url.trim_end_matches('/'));
    let response = Client::new()
        .get(&url)
        .bearer_auth(access_token)
        .query(&[("per_page", per_page)])
        .send()
        .await?;

    check_status(PROVIDER, response.status())?;

    let body = response.text().await?;
    let activities: Vec<Activity> =
        serde_json::from_str(&body).map_err(|e| ProviderError::Malformed {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

    tracing::info!("Fetched {} activities from Strava", activities.len());
    Ok(activities)
}

/// Resolve an access token, preferring a refresh exchange when possible
pub async fn access_token(base_url: &str, config: &StravaConfig) -> Result<String, ProviderError> {
    if config.can_refresh() {
        return refresh_access_token(base_url, config).await;
    }
    config
        .access_token
        .clone()
        .ok_or_else(|| ProviderError::MissingCredentials("set STRAVA_ACCESS_TOKEN".into()))
}
