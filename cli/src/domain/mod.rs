//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`
//! sockets. All functions are synchronous and take data in, returning data out.

pub mod artifact;
pub mod config;
pub mod error;
pub mod frontend;
pub mod host;
pub mod manifest;
pub mod platform;
pub mod proxy;
pub mod service;
pub mod step;

pub use config::PanelConfig;
pub use error::{ConfigError, ProvisionError};
pub use host::HostEnv;
pub use step::{ProvisionReport, Step};
