use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Service};

/// Timestamp layout used by the weather service's `hourly.time` array.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinate {
    /// Build from a GeoJSON position, which is ordered `[lon, lat]`.
    pub fn from_lon_lat(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// Hourly variables requested from the weather service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Variable {
    #[serde(rename = "temperature_2m")]
    Temperature2m,
    #[serde(rename = "relative_humidity_2m")]
    RelativeHumidity2m,
    #[serde(rename = "precipitation")]
    Precipitation,
    #[serde(rename = "wind_speed_10m")]
    WindSpeed10m,
    #[serde(rename = "soil_temperature_0cm")]
    SoilTemperature0cm,
    #[serde(rename = "soil_temperature_6cm")]
    SoilTemperature6cm,
    #[serde(rename = "soil_temperature_18cm")]
    SoilTemperature18cm,
    #[serde(rename = "soil_temperature_54cm")]
    SoilTemperature54cm,
    #[serde(rename = "soil_moisture_0_to_1cm")]
    SoilMoisture0To1cm,
    #[serde(rename = "soil_moisture_1_to_3cm")]
    SoilMoisture1To3cm,
    #[serde(rename = "soil_moisture_3_to_9cm")]
    SoilMoisture3To9cm,
    #[serde(rename = "soil_moisture_9_to_27cm")]
    SoilMoisture9To27cm,
    #[serde(rename = "soil_moisture_27_to_81cm")]
    SoilMoisture27To81cm,
}

impl Variable {
    /// Name used in the `hourly` query parameter and response object.
    pub fn as_str(&self) -> &'static str {
        match self {
            Variable::Temperature2m => "temperature_2m",
            Variable::RelativeHumidity2m => "relative_humidity_2m",
            Variable::Precipitation => "precipitation",
            Variable::WindSpeed10m => "wind_speed_10m",
            Variable::SoilTemperature0cm => "soil_temperature_0cm",
            Variable::SoilTemperature6cm => "soil_temperature_6cm",
            Variable::SoilTemperature18cm => "soil_temperature_18cm",
            Variable::SoilTemperature54cm => "soil_temperature_54cm",
            Variable::SoilMoisture0To1cm => "soil_moisture_0_to_1cm",
            Variable::SoilMoisture1To3cm => "soil_moisture_1_to_3cm",
            Variable::SoilMoisture3To9cm => "soil_moisture_3_to_9cm",
            Variable::SoilMoisture9To27cm => "soil_moisture_9_to_27cm",
            Variable::SoilMoisture27To81cm => "soil_moisture_27_to_81cm",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Variable::Temperature2m => "Temperature",
            Variable::RelativeHumidity2m => "Humidity",
            Variable::Precipitation => "Precipitation",
            Variable::WindSpeed10m => "Wind speed",
            Variable::SoilTemperature0cm => "0cm",
            Variable::SoilTemperature6cm => "6cm",
            Variable::SoilTemperature18cm => "18cm",
            Variable::SoilTemperature54cm => "54cm",
            Variable::SoilMoisture0To1cm => "0-1cm",
            Variable::SoilMoisture1To3cm => "1-3cm",
            Variable::SoilMoisture3To9cm => "3-9cm",
            Variable::SoilMoisture9To27cm => "9-27cm",
            Variable::SoilMoisture27To81cm => "27-81cm",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Variable::Temperature2m
            | Variable::SoilTemperature0cm
            | Variable::SoilTemperature6cm
            | Variable::SoilTemperature18cm
            | Variable::SoilTemperature54cm => "°C",
            Variable::RelativeHumidity2m => "%",
            Variable::Precipitation => "mm",
            Variable::WindSpeed10m => "km/h",
            Variable::SoilMoisture0To1cm
            | Variable::SoilMoisture1To3cm
            | Variable::SoilMoisture3To9cm
            | Variable::SoilMoisture9To27cm
            | Variable::SoilMoisture27To81cm => "m³/m³",
        }
    }

    /// All variables, in the order they are requested.
    pub const fn all() -> &'static [Variable] {
        &[
            Variable::Temperature2m,
            Variable::RelativeHumidity2m,
            Variable::Precipitation,
            Variable::WindSpeed10m,
            Variable::SoilTemperature0cm,
            Variable::SoilTemperature6cm,
            Variable::SoilTemperature18cm,
            Variable::SoilTemperature54cm,
            Variable::SoilMoisture0To1cm,
            Variable::SoilMoisture1To3cm,
            Variable::SoilMoisture3To9cm,
            Variable::SoilMoisture9To27cm,
            Variable::SoilMoisture27To81cm,
        ]
    }

    /// Soil temperature depths, shallowest first.
    pub const fn soil_temperatures() -> &'static [Variable] {
        &[
            Variable::SoilTemperature0cm,
            Variable::SoilTemperature6cm,
            Variable::SoilTemperature18cm,
            Variable::SoilTemperature54cm,
        ]
    }

    /// Soil moisture depth bands, shallowest first.
    pub const fn soil_moistures() -> &'static [Variable] {
        &[
            Variable::SoilMoisture0To1cm,
            Variable::SoilMoisture1To3cm,
            Variable::SoilMoisture3To9cm,
            Variable::SoilMoisture9To27cm,
            Variable::SoilMoisture27To81cm,
        ]
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Variable {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Variable::all()
            .iter()
            .copied()
            .find(|v| v.as_str() == value)
            .ok_or_else(|| anyhow::anyhow!("Unknown hourly variable '{value}'."))
    }
}

/// One timestamp axis plus one equally long value column per [`Variable`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyTimeSeries {
    time: Vec<NaiveDateTime>,
    values: BTreeMap<Variable, Vec<f64>>,
}

/// Min/max/mean of a single column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl HourlyTimeSeries {
    /// Build a series, checking that every variable is present and as long as `time`.
    pub fn new(
        time: Vec<NaiveDateTime>,
        values: BTreeMap<Variable, Vec<f64>>,
    ) -> Result<Self, QueryError> {
        let series = Self { time, values };
        series.validate()?;
        Ok(series)
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        for variable in Variable::all() {
            let column = self
                .values
                .get(variable)
                .ok_or_else(|| missing_variable(*variable))?;
            if column.len() != self.time.len() {
                return Err(QueryError::malformed(
                    Service::Weather,
                    format!(
                        "hourly variable '{variable}' has {} values but there are {} timestamps",
                        column.len(),
                        self.time.len()
                    ),
                ));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[NaiveDateTime] {
        &self.time
    }

    pub fn values(&self, variable: Variable) -> &[f64] {
        self.values.get(&variable).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn summary(&self, variable: Variable) -> Option<SeriesSummary> {
        let column = self.values(variable);
        if column.is_empty() {
            return None;
        }
        let min = column.iter().copied().fold(f64::INFINITY, f64::min);
        let max = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = column.iter().sum::<f64>() / column.len() as f64;
        Some(SeriesSummary { min, max, mean })
    }
}

fn missing_variable(variable: Variable) -> QueryError {
    QueryError::malformed(Service::Weather, format!("missing hourly variable '{variable}'"))
}

/// `hourly` object exactly as the weather service sends it.
#[derive(Debug, Deserialize)]
pub(crate) struct RawHourly {
    time: Vec<String>,
    #[serde(flatten)]
    columns: HashMap<String, Vec<Option<f64>>>,
}

impl TryFrom<RawHourly> for HourlyTimeSeries {
    type Error = QueryError;

    fn try_from(raw: RawHourly) -> Result<Self, Self::Error> {
        let time = raw
            .time
            .iter()
            .map(|s| {
                NaiveDateTime::parse_from_str(s, TIME_FORMAT).map_err(|e| {
                    QueryError::malformed(Service::Weather, format!("bad timestamp '{s}': {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut columns = raw.columns;
        let mut values = BTreeMap::new();
        for variable in Variable::all() {
            let column = columns
                .remove(variable.as_str())
                .ok_or_else(|| missing_variable(*variable))?;
            let column = column
                .into_iter()
                .enumerate()
                .map(|(i, v)| {
                    v.ok_or_else(|| {
                        QueryError::malformed(
                            Service::Weather,
                            format!("hourly variable '{variable}' has no value at index {i}"),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            values.insert(*variable, column);
        }

        HourlyTimeSeries::new(time, values)
    }
}

/// Outcome of one successful place query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub place: String,
    pub coordinate: Coordinate,
    pub series: HourlyTimeSeries,
}
