//! Configuration loading for the primary interface client

use crate::error::{PrimaryError, Result};
use crate::frame::DEFAULT_MAX_FRAME_LEN;
use crate::stream::DEFAULT_READ_SIZE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const UR_PRIMARY_PORT: u16 = 30001;
pub const UR_DASHBOARD_PORT: u16 = 29999;

/// Default config location, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/robot.yaml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub robot: RobotConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RobotConfig {
    pub host: String,
    #[serde(default)]
    pub ports: PortConfig,
    #[serde(default)]
    pub connection: ConnectionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PortConfig {
    pub primary: u16,
    pub dashboard: u16,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            primary: UR_PRIMARY_PORT,
            dashboard: UR_DASHBOARD_PORT,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConnectionConfig {
    /// Seconds
    pub timeout: Option<f64>,
    pub retry_attempts: Option<u32>,
    /// Seconds
    pub retry_delay: Option<f64>,
    pub read_buffer: Option<usize>,
    pub max_frame_len: Option<usize>,
}

impl ConnectionConfig {
    /// Connect timeout with default fallback
    pub fn timeout(&self) -> Duration {
        seconds(self.timeout, 5.0)
    }

    /// Reconnect attempts after a lost connection
    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts.unwrap_or(3)
    }

    pub fn retry_delay(&self) -> Duration {
        seconds(self.retry_delay, 1.0)
    }

    pub fn read_buffer(&self) -> usize {
        self.read_buffer.unwrap_or(DEFAULT_READ_SIZE)
    }

    pub fn max_frame_len(&self) -> usize {
        self.max_frame_len.unwrap_or(DEFAULT_MAX_FRAME_LEN)
    }
}

fn seconds(value: Option<f64>, default: f64) -> Duration {
    value
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .unwrap_or_else(|| Duration::from_secs_f64(default))
}

impl RobotConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ports: PortConfig::default(),
            connection: ConnectionConfig::default(),
        }
    }

    pub fn primary_addr(&self) -> String {
        format!("{}:{}", self.host, self.ports.primary)
    }

    pub fn dashboard_addr(&self) -> String {
        format!("{}:{}", self.host, self.ports.dashboard)
    }
}

impl Config {
    pub fn from_yaml(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| PrimaryError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_yaml(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let config = Config::from_yaml(
            r#"
robot:
  host: "192.168.1.10"
  ports:
    primary: 30011
    dashboard: 29999
  connection:
    timeout: 2.5
    retry_attempts: 0
    retry_delay: 0.5
    read_buffer: 1024
    max_frame_len: 8192
"#,
        )
        .unwrap();

        let robot = &config.robot;
        assert_eq!(robot.primary_addr(), "192.168.1.10:30011");
        assert_eq!(robot.dashboard_addr(), "192.168.1.10:29999");
        assert_eq!(robot.connection.timeout(), Duration::from_millis(2500));
        assert_eq!(robot.connection.retry_attempts(), 0);
        assert_eq!(robot.connection.retry_delay(), Duration::from_millis(500));
        assert_eq!(robot.connection.read_buffer(), 1024);
        assert_eq!(robot.connection.max_frame_len(), 8192);
    }

    #[test]
    fn test_defaults_for_missing_sections() {
        let config = Config::from_yaml("robot:\n  host: ursim\n").unwrap();
        let robot = &config.robot;
        assert_eq!(robot.ports.primary, UR_PRIMARY_PORT);
        assert_eq!(robot.ports.dashboard, UR_DASHBOARD_PORT);
        assert_eq!(robot.connection.timeout(), Duration::from_secs(5));
        assert_eq!(robot.connection.retry_attempts(), 3);
        assert_eq!(robot.connection.max_frame_len(), DEFAULT_MAX_FRAME_LEN);
    }

    #[test]
    fn test_negative_timeout_falls_back() {
        let connection = ConnectionConfig {
            timeout: Some(-1.0),
            ..Default::default()
        };
        assert_eq!(connection.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_bad_yaml_and_missing_file() {
        assert!(matches!(
            Config::from_yaml("robot: ["),
            Err(PrimaryError::Yaml(_))
        ));
        assert!(matches!(
            Config::load_from_path("does/not/exist.yaml"),
            Err(PrimaryError::Config(_))
        ));
    }

    #[test]
    fn test_shipped_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH);
        let config = Config::load_from_path(path).unwrap();
        assert_eq!(config.robot.ports.primary, UR_PRIMARY_PORT);
    }
}
