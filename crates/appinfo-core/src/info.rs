//! `/info` payload.
//!
//! `VersionInfo` is backed by a `BTreeMap` so keys always serialize in
//! ascending order and repeated calls produce byte-identical bodies.

use std::collections::BTreeMap;

use serde::Serialize;

/// Key for the runtime (toolchain) version.
pub const KEY_RUNTIME: &str = "rust";
/// Key for the operating system name and version.
pub const KEY_OS: &str = "os";
/// Key for the hosting server identity.
pub const KEY_SERVER: &str = "server";
/// Key for the detected external library version.
pub const KEY_LIBRARY: &str = "openssl";

/// Raw environment facts gathered by the host.
///
/// Unavailable values are empty strings; nothing here is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostFacts {
    pub runtime_version: String,
    pub os_name: String,
    pub os_version: String,
    pub server_info: String,
    pub library_version: Option<String>,
}

/// Sorted fact name -> value mapping returned by `GET /info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VersionInfo(BTreeMap<String, String>);

impl VersionInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_facts(facts: &HostFacts) -> Self {
        let mut info = Self::new();
        info.insert(KEY_RUNTIME, format!("Rust {}", facts.runtime_version));
        info.insert(KEY_OS, format!("{} {}", facts.os_name, facts.os_version));
        info.insert(KEY_SERVER, facts.server_info.clone());
        if let Some(lib) = &facts.library_version {
            info.insert(KEY_LIBRARY, lib.clone());
        }
        info
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Keys in serialization order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self)
            .map_err(|e| crate::AppInfoError::Internal(format!("serialize info failed: {e}")))
    }
}
