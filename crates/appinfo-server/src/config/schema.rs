use std::time::Duration;

use appinfo_core::error::{AppInfoError, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppInfoConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl AppInfoConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(AppInfoError::UnsupportedVersion);
        }
        self.server.validate()?;
        self.metrics.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Overrides the identity reported under `server` in `/info`.
    #[serde(default)]
    pub server_info: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            server_info: None,
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(AppInfoError::BadRequest(format!(
                "server.listen must be a valid SocketAddr: {}",
                self.listen
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Value of the `application` tag on every metric.
    #[serde(default = "default_application")]
    pub application: String,

    #[serde(default)]
    pub probe: ProbeSection,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            application: default_application(),
            probe: ProbeSection::default(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if self.application.trim().is_empty() {
            return Err(AppInfoError::BadRequest(
                "metrics.application must not be empty".into(),
            ));
        }
        self.probe.validate()
    }
}

/// External library version probe.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "default_args")]
    pub args: Vec<String>,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ProbeSection {
    fn default() -> Self {
        Self {
            enabled: true,
            program: default_program(),
            args: default_args(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ProbeSection {
    pub fn validate(&self) -> Result<()> {
        if self.program.trim().is_empty() {
            return Err(AppInfoError::BadRequest(
                "metrics.probe.program must not be empty".into(),
            ));
        }
        if !(100..=60000).contains(&self.timeout_ms) {
            return Err(AppInfoError::BadRequest(
                "metrics.probe.timeout_ms must be between 100 and 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_application() -> String {
    "appinfo".into()
}
fn default_true() -> bool {
    true
}
fn default_program() -> String {
    "openssl".into()
}
fn default_args() -> Vec<String> {
    vec!["version".into(), "-a".into()]
}
fn default_timeout_ms() -> u64 {
    5000
}
