//! appinfo core: transport-agnostic fact types, metric tags, and errors.
//!
//! This crate defines the data shared by the server crate and its tests: the
//! `/info` payload, the host facts it is built from, the tag set carried by the
//! application info counter, and the error surface. It carries no transport or
//! runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod info;
pub mod tags;

/// Shared result type.
pub use error::{AppInfoError, Result};
pub use info::{HostFacts, VersionInfo};
pub use tags::CustomMetricTags;
