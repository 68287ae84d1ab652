use std::sync::Arc;

use reqwest::Client;

use crate::{
    Config, QueryResult,
    error::QueryError,
    forecast::{OpenMeteoClient, WeatherSource},
    geocode::{Geocoder, NominatimGeocoder},
};

/// Geocode, then fetch the forecast for the first match.
#[derive(Debug, Clone)]
pub struct QueryPipeline {
    geocoder: Arc<dyn Geocoder>,
    weather: Arc<dyn WeatherSource>,
}

impl QueryPipeline {
    pub fn new(geocoder: Arc<dyn Geocoder>, weather: Arc<dyn WeatherSource>) -> Self {
        Self { geocoder, weather }
    }

    /// Pipeline against the services named in `config`, sharing one HTTP client.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self::new(
            Arc::new(NominatimGeocoder::from_config(config, http.clone())),
            Arc::new(OpenMeteoClient::from_config(config, http)),
        ))
    }

    #[tracing::instrument(skip(self))]
    pub async fn run(&self, place: &str) -> Result<QueryResult, QueryError> {
        match self.stages(place).await {
            Ok(result) => {
                tracing::info!(
                    latitude = result.coordinate.latitude,
                    longitude = result.coordinate.longitude,
                    samples = result.series.len(),
                    "query succeeded"
                );
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(error = %e, "query failed");
                Err(e)
            }
        }
    }

    /// Like [`run`](Self::run), with every failure collapsed to `None`.
    pub async fn run_opt(&self, place: &str) -> Option<QueryResult> {
        self.run(place).await.ok()
    }

    async fn stages(&self, place: &str) -> Result<QueryResult, QueryError> {
        let place = place.trim();
        let coordinate = self.geocoder.resolve(place).await?;
        let series = self.weather.fetch(coordinate).await?;

        Ok(QueryResult {
            place: place.to_string(),
            coordinate,
            series,
        })
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use async_trait::async_trait;

    use super::*;
    use crate::{Coordinate, HourlyTimeSeries, Service, model::testing};

    /// Known places, each with an optional artificial delay.
    #[derive(Debug, Default)]
    pub(crate) struct FakeGeocoder {
        pub places: HashMap<String, (Coordinate, Duration)>,
        pub calls: AtomicUsize,
    }

    impl FakeGeocoder {
        pub fn with(mut self, place: &str, lon: f64, lat: f64, delay_ms: u64) -> Self {
            self.places.insert(
                place.to_string(),
                (Coordinate::from_lon_lat(lon, lat), Duration::from_millis(delay_ms)),
            );
            self
        }
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn resolve(&self, place: &str) -> Result<Coordinate, QueryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (coordinate, delay) = self.places.get(place).copied().ok_or_else(|| {
                QueryError::NotFound {
                    place: place.to_string(),
                }
            })?;
            tokio::time::sleep(delay).await;
            Ok(coordinate)
        }
    }

    /// Serves 72 hourly samples, or fails when `down` is set.
    #[derive(Debug, Default)]
    pub(crate) struct FakeWeather {
        pub down: bool,
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl WeatherSource for FakeWeather {
        async fn fetch(&self, at: Coordinate) -> Result<HourlyTimeSeries, QueryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.down {
                return Err(QueryError::HttpStatus {
                    service: Service::Weather,
                    status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                    body: String::new(),
                });
            }
            // Tag every sample with the latitude so tests can tell results apart.
            Ok(testing::series(72, |_, i| at.latitude + i as f64 / 100.0))
        }
    }
}
