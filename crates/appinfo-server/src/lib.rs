//! appinfo server library entry.
//!
//! Wires config, the server context, the metrics lifecycle and the HTTP
//! handlers into one axum application. Consumed by the binary (`main.rs`) and
//! by integration tests.

pub mod app_state;
pub mod config;
pub mod context;
pub mod info;
pub mod lifecycle;
pub mod obs;
pub mod ops;
pub mod router;
