use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

pub const DEFAULT_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_USER_AGENT: &str = concat!("soilview/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_FORECAST_DAYS: u8 = 3;

/// The weather service does not forecast further than this.
pub const MAX_FORECAST_DAYS: u8 = 16;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// geocoding_url = "https://nominatim.openstreetmap.org/search"
/// weather_url = "https://api.open-meteo.com/v1/forecast"
/// forecast_days = 3
/// output_dir = "/home/me/charts"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub geocoding_url: String,
    pub weather_url: String,
    /// Nominatim rejects requests without an identifying agent.
    pub user_agent: String,
    pub forecast_days: u8,
    pub timeout_secs: u64,
    /// Where rendered charts go; the working directory when unset.
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            weather_url: DEFAULT_WEATHER_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            timeout_secs: 10,
            output_dir: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return the defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let cfg = Self::load_unchecked()?;
        cfg.validate().context("Invalid configuration file")?;
        Ok(cfg)
    }

    /// Like [`Config::load`], but out-of-range values are kept so they can be edited.
    pub fn load_unchecked() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg = Self::parse(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse TOML without validating field values.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.validate()?;
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "soilview", "soilview")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        for (field, url) in [
            ("geocoding_url", &self.geocoding_url),
            ("weather_url", &self.weather_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow!("{field} must be an http(s) URL, got '{url}'"));
            }
        }

        if !(1..=MAX_FORECAST_DAYS).contains(&self.forecast_days) {
            return Err(anyhow!(
                "forecast_days must be between 1 and {MAX_FORECAST_DAYS}, got {}",
                self.forecast_days
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err(anyhow!("user_agent must not be empty"));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Directory charts are written to.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_services() {
        let cfg = Config::default();

        assert_eq!(cfg.geocoding_url, DEFAULT_GEOCODING_URL);
        assert_eq!(cfg.weather_url, DEFAULT_WEATHER_URL);
        assert_eq!(cfg.forecast_days, 3);
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.output_dir(), PathBuf::from("."));
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_fields() {
        let cfg = Config::from_toml(
            r#"
            weather_url = "http://localhost:8080/v1/forecast"
            output_dir = "/tmp/charts"
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(cfg.weather_url, "http://localhost:8080/v1/forecast");
        assert_eq!(cfg.geocoding_url, DEFAULT_GEOCODING_URL);
        assert_eq!(cfg.output_dir(), PathBuf::from("/tmp/charts"));
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn rejects_out_of_range_forecast_days() {
        let err = Config::from_toml("forecast_days = 30").unwrap_err();
        assert!(format!("{err:#}").contains("forecast_days must be between 1 and 16"));
    }

    #[test]
    fn unchecked_parse_keeps_invalid_values_for_editing() {
        let cfg = Config::parse("forecast_days = 30").expect("syntax is valid");
        assert_eq!(cfg.forecast_days, 30);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_non_http_urls() {
        let cfg = Config {
            geocoding_url: "ftp://example.org".into(),
            ..Config::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("geocoding_url must be an http(s) URL"));
    }

    #[test]
    fn toml_roundtrip_preserves_values() {
        let cfg = Config {
            forecast_days: 5,
            output_dir: Some(PathBuf::from("charts")),
            ..Config::default()
        };
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), cfg);
    }
}
