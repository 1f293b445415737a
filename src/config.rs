use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::models::solar::SystemConfig;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "SOLAR_PLANNER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub geocoder: GeocoderConfig,
    pub irradiance: IrradianceConfig,
    pub cache: CacheConfig,
    /// Used when a request omits its own system parameters
    pub defaults: SystemConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    /// Nominatim rejects anonymous clients; identify the deployment
    pub user_agent: String,
    pub timeout_s: u64,
    /// Minimum spacing between two upstream requests
    pub min_interval_ms: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("solar-planner/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_s: 10,
            min_interval_ms: 1000,
        }
    }
}

impl GeocoderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_s)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IrradianceConfig {
    pub base_url: String,
    pub timeout_s: u64,
    /// Days between today and the newest finalized archive record
    pub archive_delay_days: u32,
}

impl Default for IrradianceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://archive-api.open-meteo.com".to_string(),
            timeout_s: 15,
            archive_delay_days: 5,
        }
    }
}

impl IrradianceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_s)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// `null` keeps entries for the life of the process
    pub ttl_s: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_s: Some(3600) }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_s.map(Duration::from_secs)
    }
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {path}"))?;
        Self::from_json(&content).with_context(|| format!("parsing config file {path}"))
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: Config = serde_json::from_str(content)?;
        config
            .defaults
            .validate()
            .context("invalid default system parameters")?;
        Ok(config)
    }

    /// Path from `SOLAR_PLANNER_CONFIG`, else `config.json`.
    pub fn path_from_env() -> String {
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.geocoder.timeout(), Duration::from_secs(10));
        assert_eq!(config.irradiance.timeout(), Duration::from_secs(15));
        assert_eq!(config.irradiance.archive_delay_days, 5);
        assert_eq!(config.cache.ttl(), Some(Duration::from_secs(3600)));
        assert_eq!(config.defaults, SystemConfig::default());
    }

    #[test]
    fn test_partial_sections_and_unbounded_cache() {
        let config = Config::from_json(
            r#"{"server": {"port": 9000}, "cache": {"ttl_s": null},
                "geocoder": {"user_agent": "rooftop-test"}}"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.cache.ttl(), None);
        assert_eq!(config.geocoder.user_agent, "rooftop-test");
        assert_eq!(config.geocoder.min_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_invalid_defaults_rejected() {
        let err = Config::from_json(
            r#"{"defaults": {"capacity_kw": 5.0, "efficiency": 0.78,
                              "electricity_rate": 0.0, "monthly_bill": 3000.0}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid default system parameters"));
    }
}
