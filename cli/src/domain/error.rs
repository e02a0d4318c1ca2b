//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Fatal errors raised by provisioning steps. None of them are retried.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("must be run as root (effective uid is {uid}). Retry with: sudo mimipanel")]
    NotPrivileged { uid: u32 },

    #[error("another mimipanel run holds {}. Wait for it to finish.", path.display())]
    Locked { path: PathBuf },

    #[error("cannot read platform identification from {}", path.display())]
    PlatformUnreadable { path: PathBuf },

    #[error("unsupported platform '{id}'. Supported: {allowed}")]
    UnsupportedPlatform { id: String, allowed: String },

    #[error("failed to install package set '{set}': {detail}")]
    PackageInstall { set: String, detail: String },

    #[error("failed to install runtime '{runtime}': {detail}")]
    RuntimeInstall { runtime: String, detail: String },

    #[error("artifact acquisition failed: {detail}")]
    Acquisition { detail: String },

    #[error("source-control credential is empty")]
    EmptyCredential,

    #[error("no source-control credential available. Set MIMIPANEL_GIT_TOKEN or run interactively.")]
    MissingCredential,

    #[error("artifact checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("service '{service}' failed to start: {detail}")]
    ServiceStart { service: String, detail: String },

    #[error("frontend bring-up failed: {detail}")]
    Frontend { detail: String },

    #[error("proxy configuration failed: {detail}")]
    Proxy { detail: String },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration:\n  - {}", errors.join("\n  - "))]
    Invalid { errors: Vec<String> },
}
