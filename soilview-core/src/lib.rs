//! Core library for the `soilview` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - Place geocoding and the hourly soil/air forecast fetch
//! - The query pipeline tying the two together
//! - Chart rendering (soil moisture grid, soil temperature, air temperature/humidity)
//! - The view controller: a pure reducer over session state
//!
//! It is used by `soilview-cli`, but can also be reused by other binaries or services.

pub mod chart;
pub mod config;
pub mod error;
pub mod forecast;
pub mod geocode;
pub mod model;
pub mod query;
pub mod view;

pub use config::Config;
pub use error::{FailureKind, QueryError, Service};
pub use forecast::{OpenMeteoClient, WeatherSource};
pub use geocode::{Geocoder, NominatimGeocoder};
pub use model::{Coordinate, HourlyTimeSeries, QueryResult, SeriesSummary, Variable};
pub use query::QueryPipeline;
pub use view::{Action, Outcome, Phase, Session, Tab, ViewState, reduce};
