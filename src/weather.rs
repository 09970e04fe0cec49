//! OpenWeatherMap 5-day / 3-hour forecast client.
//!
//! Fetches the intervals that [`crate::forecast::build_forecast_summary`]
//! turns into a prompt.

use crate::forecast::ForecastItem;
use crate::{Error, Result};
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// About two days of three-hour intervals.
const INTERVAL_COUNT: u32 = 16;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    dt_txt: String,
    main: MainReadings,
    wind: WindReadings,
    #[serde(default)]
    rain: Option<RainReadings>,
    clouds: CloudReadings,
    weather: Vec<WeatherCondition>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct WindReadings {
    speed: f64,
    #[serde(default)]
    gust: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RainReadings {
    #[serde(rename = "3h", default)]
    three_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CloudReadings {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct WeatherCondition {
    description: String,
}

impl TryFrom<ForecastEntry> for ForecastItem {
    type Error = Error;

    fn try_from(entry: ForecastEntry) -> Result<Self> {
        let at = NaiveDateTime::parse_from_str(&entry.dt_txt, "%Y-%m-%d %H:%M:%S")
            .map_err(|e| Error::Forecast(format!("Bad dt_txt '{}': {}", entry.dt_txt, e)))?;
        let description = entry
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .ok_or_else(|| Error::Forecast(format!("No weather condition for {}", entry.dt_txt)))?;

        Ok(ForecastItem {
            date_time: at.format("%a %H:%M").to_string(),
            temperature: entry.main.temp,
            humidity: entry.main.humidity,
            wind_speed: entry.wind.speed,
            wind_gust: entry.wind.gust.unwrap_or(entry.wind.speed),
            rainfall: entry.rain.and_then(|r| r.three_hours).unwrap_or(0.0),
            clouds: entry.clouds.all,
            description,
        })
    }
}

#[derive(Clone)]
pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::new_with_client(api_key, Client::new())
    }

    pub fn new_with_client(api_key: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Forecast intervals for a Malaysian city, in metric units.
    pub async fn fetch_forecast(&self, city: &str) -> Result<Vec<ForecastItem>> {
        tracing::debug!("Fetching forecast for {} from OpenWeatherMap", city);

        let location = format!("{},MY", city);
        let count = INTERVAL_COUNT.to_string();
        let response = self
            .client
            .get(format!("{}/data/2.5/forecast", self.base_url))
            .timeout(self.timeout)
            .query(&[
                ("q", location.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("cnt", count.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to OpenWeatherMap: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("OpenWeatherMap error (status {})", status);
            return Err(Error::Forecast(format!("API Error: HTTP {}", status.as_u16())));
        }

        let body = response.text().await?;
        let parsed: ForecastResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse OpenWeatherMap response: {}", e);
            Error::Forecast(format!("Failed to parse forecast: {}", e))
        })?;

        parsed.list.into_iter().map(ForecastItem::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(server: &MockServer) -> OpenWeatherClient {
        OpenWeatherClient::new("weather-key".to_string()).with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_fetch_forecast_maps_entries() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("q", "Ipoh,MY"))
            .and(query_param("appid", "weather-key"))
            .and(query_param("units", "metric"))
            .and(query_param("cnt", "16"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "list": [
                    {
                        "dt_txt": "2026-10-19 15:00:00",
                        "main": { "temp": 29.41, "humidity": 84 },
                        "wind": { "speed": 4.2, "gust": 7.9, "deg": 200 },
                        "rain": { "3h": 12.5 },
                        "clouds": { "all": 92 },
                        "weather": [{ "description": "moderate rain", "icon": "10d" }]
                    },
                    {
                        "dt_txt": "2026-10-19 18:00:00",
                        "main": { "temp": 27.0, "humidity": 78 },
                        "wind": { "speed": 3.1 },
                        "clouds": { "all": 40 },
                        "weather": [{ "description": "scattered clouds", "icon": "03d" }]
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let items = make_client(&server).fetch_forecast("Ipoh").await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].date_time, "Mon 15:00");
        assert_eq!(items[0].temperature, 29.41);
        assert_eq!(items[0].humidity, 84);
        assert_eq!(items[0].wind_gust, 7.9);
        assert_eq!(items[0].rainfall, 12.5);
        assert_eq!(items[0].clouds, 92);
        assert_eq!(items[0].description, "moderate rain");

        // Missing gust falls back to speed, missing rain to zero
        assert_eq!(items[1].wind_gust, 3.1);
        assert_eq!(items[1].rainfall, 0.0);
    }

    #[tokio::test]
    async fn test_http_error_returns_forecast_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .mount(&server)
            .await;

        let err = make_client(&server).fetch_forecast("Ipoh").await.unwrap_err();
        assert!(matches!(err, Error::Forecast(_)));
        assert!(err.to_string().contains("API Error: HTTP 401"));
    }

    #[tokio::test]
    async fn test_malformed_timestamp_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "list": [{
                    "dt_txt": "yesterday",
                    "main": { "temp": 27.0, "humidity": 78 },
                    "wind": { "speed": 3.1 },
                    "clouds": { "all": 40 },
                    "weather": [{ "description": "haze" }]
                }]
            })))
            .mount(&server)
            .await;

        let err = make_client(&server).fetch_forecast("Ipoh").await.unwrap_err();
        assert!(matches!(err, Error::Forecast(_)));
    }
}
