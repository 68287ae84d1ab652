//! Coordinate resolver: free-text place name to `[lon, lat]` via Nominatim.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{
    Config, Coordinate,
    error::{QueryError, Service, truncate_body},
};

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Coordinate of the first match for `place`.
    async fn resolve(&self, place: &str) -> Result<Coordinate, QueryError>;
}

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    url: String,
    http: Client,
}

impl NominatimGeocoder {
    pub fn new(url: impl Into<String>, http: Client) -> Self {
        Self {
            url: url.into(),
            http,
        }
    }

    pub fn from_config(config: &Config, http: Client) -> Self {
        Self::new(config.geocoding_url.clone(), http)
    }
}

#[derive(Debug, Deserialize)]
struct GeoJsonCollection {
    features: Vec<GeoJsonFeature>,
}

#[derive(Debug, Deserialize)]
struct GeoJsonFeature {
    geometry: GeoJsonGeometry,
}

#[derive(Debug, Deserialize)]
struct GeoJsonGeometry {
    coordinates: Vec<f64>,
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, place: &str) -> Result<Coordinate, QueryError> {
        let place = place.trim();
        if place.is_empty() {
            return Err(QueryError::NotFound {
                place: place.to_string(),
            });
        }

        tracing::debug!(url = %self.url, place, "geocoding request");

        let res = self
            .http
            .get(&self.url)
            .query(&[("q", place), ("format", "geojson")])
            .send()
            .await
            .map_err(|source| QueryError::Network {
                service: Service::Geocoding,
                source,
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| QueryError::Network {
            service: Service::Geocoding,
            source,
        })?;

        if !status.is_success() {
            return Err(QueryError::HttpStatus {
                service: Service::Geocoding,
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: GeoJsonCollection = serde_json::from_str(&body)
            .map_err(|e| QueryError::malformed(Service::Geocoding, e.to_string()))?;

        let feature = parsed.features.first().ok_or_else(|| QueryError::NotFound {
            place: place.to_string(),
        })?;

        match feature.geometry.coordinates.as_slice() {
            [lon, lat, ..] => Ok(Coordinate::from_lon_lat(*lon, *lat)),
            other => Err(QueryError::malformed(
                Service::Geocoding,
                format!("expected [lon, lat] but got {} numbers", other.len()),
            )),
        }
    }
}
