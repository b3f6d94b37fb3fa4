//! Server config loader (strict parsing).

pub mod schema;

use std::fs;

use appinfo_core::error::{AppInfoError, Result};

pub use schema::{AppInfoConfig, MetricsSection, ProbeSection, ServerSection};

/// Config path used when neither a CLI argument nor `APPINFO_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "appinfo.yaml";

pub fn load_from_file(path: &str) -> Result<AppInfoConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| AppInfoError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<AppInfoConfig> {
    let cfg: AppInfoConfig = serde_yaml::from_str(s)
        .map_err(|e| AppInfoError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve the config path: first CLI argument, then `APPINFO_CONFIG`, then the default.
pub fn resolve_path(arg: Option<String>) -> String {
    arg.or_else(|| std::env::var("APPINFO_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}
