//! Open-Meteo forecast provider.

use super::{check_status, ProviderError};
use reqwest::Client;
use taper_core::config::LocationConfig;
use taper_core::weather::{Forecast, OpenMeteoResponse};

pub const OPEN_METEO_BASE: &str = "https://api.open-meteo.com";
const PROVIDER: &str = "Open-Meteo";

/// Fetch the daily and hourly forecast for a location
pub async fn fetch_forecast(
    base_url: &str,
    location: &LocationConfig,
) -> Result<Forecast, ProviderError> {
    let url = format!("{}/v1/forecast", base_url.trim_end_matches('/'));
    tracing::debug!("Fetching forecast from {}", url);

    let response = Client::new()
        .get(&url)
        .query(&[
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            (
                "daily",
                "temperature_2m_max,precipitation_probability_max,weathercode".to_string(),
            ),
            ("hourly", "temperature_2m,precipitation_probability".to_string()),
            ("timezone", location.timezone.clone()),
        ])
        .send()
        .await?;

    check_status(PROVIDER, response.status())?;

    let body = response.text().await?;
    let payload: OpenMeteoResponse =
        serde_json::from_str(&body).map_err(|e| ProviderError::Malformed {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

    let forecast = Forecast::from(payload);
    tracing::info!("Forecast covers {} days", forecast.daily.len());
    Ok(forecast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mockito::Matcher;

    const BODY: &str = r#"{
        "daily": {
            "time": ["2026-06-13"],
            "temperature_2m_max": [18.0],
            "precipitation_probability_max": [20],
            "weathercode": [1]
        },
        "hourly": {
            "time": ["2026-06-13T06:00", "2026-06-13T07:00"],
            "temperature_2m": [9.0, 10.0],
            "precipitation_probability": [10, 0]
        }
    }"#;

    #[tokio::test]
    async fn test_fetch_forecast_decodes_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/forecast")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("latitude".into(), "47.16".into()),
                Matcher::UrlEncoded("timezone".into(), "America/Los_Angeles".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BODY)
            .create_async()
            .await;

        let forecast = fetch_forecast(&server.url(), &LocationConfig::default())
            .await
            .unwrap();

        mock.assert_async().await;
        let date = NaiveDate::from_ymd_opt(2026, 6, 13).unwrap();
        assert_eq!(forecast.daily[&date].temp_f, 64);
        assert_eq!(forecast.hourly[&date].len(), 2);
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/forecast")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let err = fetch_forecast(&server.url(), &LocationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Status { .. }));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/forecast")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let err = fetch_forecast(&server.url(), &LocationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Malformed { .. }));
    }
}
