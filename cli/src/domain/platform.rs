//! Platform identification from `os-release` content.
//!
//! Pure functions only: the caller reads the file.

use std::collections::HashMap;

use anyhow::Result;

use crate::domain::error::ProvisionError;

/// The parts of `os-release` the provisioner cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub id: String,
    pub id_like: Vec<String>,
    pub version_id: Option<String>,
    pub pretty_name: Option<String>,
}

impl Platform {
    /// Human-readable name, falling back to the bare id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.pretty_name.as_deref().unwrap_or(&self.id)
    }
}

/// Parse `os-release` syntax: `KEY=VALUE` lines, optional quotes, `#` comments.
#[must_use]
pub fn parse_os_release(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| l.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), unquote(v.trim()).to_string()))
        .collect()
}

fn unquote(value: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = value.strip_prefix(q).and_then(|v| v.strip_suffix(q)) {
            return inner;
        }
    }
    value
}

/// Build a [`Platform`] from `os-release` content.
///
/// A missing `ID` defaults to `linux`, as the os-release format specifies.
#[must_use]
pub fn platform_from_os_release(content: &str) -> Platform {
    let mut fields = parse_os_release(content);
    let id = fields
        .remove("ID")
        .map_or_else(|| "linux".to_string(), |v| v.to_ascii_lowercase());
    let id_like = fields
        .remove("ID_LIKE")
        .map(|v| v.split_whitespace().map(str::to_ascii_lowercase).collect())
        .unwrap_or_default();
    Platform {
        id,
        id_like,
        version_id: fields.remove("VERSION_ID"),
        pretty_name: fields.remove("PRETTY_NAME"),
    }
}

/// Accept the platform when its `ID` or any `ID_LIKE` entry is allow-listed.
///
/// # Errors
///
/// Returns [`ProvisionError::UnsupportedPlatform`] otherwise.
pub fn check_supported(platform: &Platform, allowed: &[String]) -> Result<()> {
    let matches = |id: &str| allowed.iter().any(|a| a.eq_ignore_ascii_case(id));
    if matches(&platform.id) || platform.id_like.iter().any(|l| matches(l)) {
        return Ok(());
    }
    Err(ProvisionError::UnsupportedPlatform {
        id: platform.id.clone(),
        allowed: allowed.join(", "),
    }
    .into())
}
