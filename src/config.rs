use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub sources: SourcesConfig,
    #[serde(default)]
    pub fence: FenceConfig,
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub ground_station: String,
    pub satellite: String,
    #[serde(
        default = "default_poll_interval",
        deserialize_with = "duration_str"
    )]
    pub poll_interval: Duration,
    #[serde(default = "default_timeout", deserialize_with = "duration_str")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FenceConfig {
    // clamped into [100, 5000] when the engine starts
    #[serde(default = "default_radius_m")]
    pub default_radius_m: u32,
}

impl Default for FenceConfig {
    fn default() -> Self {
        Self {
            default_radius_m: default_radius_m(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_radius_m() -> u32 {
    1000
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn duration_str<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}
