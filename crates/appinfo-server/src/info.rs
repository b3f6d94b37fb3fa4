//! `GET /info`: runtime, OS and server identity as a sorted JSON object.

use axum::{extract::State, Json};
use sysinfo::System;

use appinfo_core::{HostFacts, VersionInfo};

use crate::app_state::AppState;

/// Version of the rustc that built this binary.
pub const RUNTIME_VERSION: &str = env!("VERGEN_RUSTC_SEMVER");

/// Default server identity.
pub const SERVER_INFO: &str = concat!("appinfo-server/", env!("CARGO_PKG_VERSION"));

/// Gather the facts for one response. Unknown OS values become empty strings.
pub fn host_facts(
    runtime_version: &str,
    server_info: &str,
    library_version: Option<&str>,
) -> HostFacts {
    HostFacts {
        runtime_version: runtime_version.to_string(),
        os_name: System::name().unwrap_or_default(),
        os_version: System::os_version().unwrap_or_default(),
        server_info: server_info.to_string(),
        library_version: library_version.map(str::to_string),
    }
}

pub async fn info(State(state): State<AppState>) -> Json<VersionInfo> {
    let facts = host_facts(
        state.runtime_version(),
        state.server_info(),
        state.library_version(),
    );
    tracing::debug!(?facts, "serving version info");
    Json(VersionInfo::from_facts(&facts))
}
