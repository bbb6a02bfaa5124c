//! Transport layer for the expense server.
//!
//! This module provides the transport adapters:
//! - **STDIO**: standard input/output framing for subprocess clients - feature: `stdio`
//! - **HTTP**: SSE streaming endpoints plus the single-shot POST route - feature: `http`
//!
//! Each transport handles the connection lifecycle and delegates tool
//! dispatch to the same registry, so every adapter presents identical
//! semantics: accept an operation invocation, return a text result.

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "http")]
pub use config::HttpConfig;
