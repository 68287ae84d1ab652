//! Weather fetcher: hourly air and soil forecast for a coordinate from Open-Meteo.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{
    Config, Coordinate, HourlyTimeSeries, Variable,
    config::DEFAULT_FORECAST_DAYS,
    error::{QueryError, Service, truncate_body},
    model::RawHourly,
};

#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch(&self, at: Coordinate) -> Result<HourlyTimeSeries, QueryError>;
}

#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    url: String,
    forecast_days: u8,
    http: Client,
}

impl OpenMeteoClient {
    pub fn new(url: impl Into<String>, http: Client) -> Self {
        Self {
            url: url.into(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            http,
        }
    }

    pub fn from_config(config: &Config, http: Client) -> Self {
        Self::new(config.weather_url.clone(), http).with_forecast_days(config.forecast_days)
    }

    pub fn with_forecast_days(mut self, days: u8) -> Self {
        self.forecast_days = days;
        self
    }

    fn query_params(&self, at: Coordinate) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", at.latitude.to_string()),
            ("longitude", at.longitude.to_string()),
            ("hourly", hourly_param()),
            ("forecast_days", self.forecast_days.to_string()),
        ]
    }
}

/// Comma-joined wire names of every requested variable.
pub fn hourly_param() -> String {
    Variable::all()
        .iter()
        .map(Variable::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: Option<RawHourly>,
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn fetch(&self, at: Coordinate) -> Result<HourlyTimeSeries, QueryError> {
        tracing::debug!(
            url = %self.url,
            latitude = at.latitude,
            longitude = at.longitude,
            days = self.forecast_days,
            "weather request"
        );

        let res = self
            .http
            .get(&self.url)
            .query(&self.query_params(at))
            .send()
            .await
            .map_err(|source| QueryError::Network {
                service: Service::Weather,
                source,
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| QueryError::Network {
            service: Service::Weather,
            source,
        })?;

        if !status.is_success() {
            return Err(QueryError::HttpStatus {
                service: Service::Weather,
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: ForecastResponse = serde_json::from_str(&body)
            .map_err(|e| QueryError::malformed(Service::Weather, e.to_string()))?;

        let hourly = parsed.hourly.ok_or_else(|| {
            QueryError::malformed(Service::Weather, "response has no 'hourly' field")
        })?;

        HourlyTimeSeries::try_from(hourly)
    }
}
