// ABOUTME: Runtime configuration loaded from an optional TOML file
// ABOUTME: Covers service endpoints, polling limits and HTTP timeouts

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_REGISTRATION_URL: &str = "https://emastered.com/ajax.php";
pub const DEFAULT_UPLOAD_URL: &str = "https://emastered.s3-accelerate.amazonaws.com/";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoints: EndpointConfig,
    pub polling: PollConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub registration_url: String,
    pub upload_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            registration_url: DEFAULT_REGISTRATION_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_ms: u64,
    /// Unset means poll until the job finishes
    pub max_wait_secs: Option<u64>,
    /// Consecutive transport failures tolerated before giving up
    pub transport_retries: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_wait_secs: None,
            transport_retries: 0,
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    /// Deadline for the registration and status calls only; file transfers have none
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            request_timeout_secs: 300,
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }
}
