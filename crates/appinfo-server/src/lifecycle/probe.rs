//! External library version probe.
//!
//! Runs the configured tool (by default `openssl version -a`) and turns its
//! version banner into a single string. Every way of not getting a version is
//! an `Unavailable` value carrying the reason; nothing here returns an error.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::config::ProbeSection;

/// Second banner lines containing this phrase are dropped.
pub const UNAVAILABLE_MARKER: &str = "not available";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryProbe {
    Detected(String),
    Unavailable(String),
}

impl LibraryProbe {
    pub fn version(&self) -> Option<&str> {
        match self {
            LibraryProbe::Detected(v) => Some(v),
            LibraryProbe::Unavailable(_) => None,
        }
    }

    pub fn is_detected(&self) -> bool {
        matches!(self, LibraryProbe::Detected(_))
    }

    fn unavailable(reason: impl Into<String>) -> Self {
        LibraryProbe::Unavailable(reason.into())
    }
}

/// Combine the first banner line with the second one, unless the second
/// reports itself as not available.
///
/// Returns `None` when there is no first line, and also when the first line
/// is blank: `"\nOpenSSL 3.0.2\n"` counts as no output instead of yielding
/// `" OpenSSL 3.0.2"` with the primary version missing. A blank second line
/// is ignored rather than appended as a trailing space.
pub fn parse_version_banner(stdout: &str) -> Option<String> {
    let mut lines = stdout.lines();
    let first = lines.next()?.trim();
    if first.is_empty() {
        return None;
    }

    let mut version = first.to_string();
    if let Some(second) = lines.next().map(str::trim) {
        if !second.is_empty() && !second.contains(UNAVAILABLE_MARKER) {
            version.push(' ');
            version.push_str(second);
        }
    }
    Some(version)
}

/// Probe as configured; a disabled probe is reported without spawning anything.
pub async fn probe_configured<C>(cfg: &ProbeSection, cancel: C) -> LibraryProbe
where
    C: Future<Output = ()>,
{
    if !cfg.enabled {
        tracing::debug!("library version probe disabled");
        return LibraryProbe::unavailable("disabled");
    }
    probe_library_version(&cfg.program, &cfg.args, cfg.timeout(), cancel).await
}

/// Spawn `program args..`, wait up to `timeout`, and parse its stdout.
///
/// Resolving `cancel` before the tool exits yields `Unavailable("cancelled")`.
/// The child is killed when it outlives the probe.
pub async fn probe_library_version<C>(
    program: &str,
    args: &[String],
    timeout: Duration,
    cancel: C,
) -> LibraryProbe
where
    C: Future<Output = ()>,
{
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn();

    let child = match child {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(program, error = %e, "failed to get library version");
            return LibraryProbe::unavailable(format!("spawn failed: {e}"));
        }
    };

    let waited = tokio::select! {
        biased;
        _ = cancel => {
            tracing::warn!(program, "library version probe cancelled");
            return LibraryProbe::unavailable("cancelled");
        }
        res = tokio::time::timeout(timeout, child.wait_with_output()) => res,
    };

    let output = match waited {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            tracing::warn!(program, error = %e, "failed to get library version");
            return LibraryProbe::unavailable(format!("wait failed: {e}"));
        }
        Err(_) => {
            tracing::warn!(
                program,
                timeout_ms = timeout.as_millis() as u64,
                "library version probe timed out"
            );
            return LibraryProbe::unavailable("timed out");
        }
    };

    if !output.status.success() {
        tracing::warn!(program, status = %output.status, "unable to get library version");
        return LibraryProbe::unavailable(match output.status.code() {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        });
    }

    match parse_version_banner(&String::from_utf8_lossy(&output.stdout)) {
        Some(version) => {
            tracing::debug!(program, %version, "library version detected");
            LibraryProbe::Detected(version)
        }
        None => {
            tracing::warn!(program, "failed to get library version: no output");
            LibraryProbe::unavailable("no output")
        }
    }
}
