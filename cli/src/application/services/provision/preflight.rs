//! Steps 1 and 2: privilege check, run lock, platform detection.

use std::any::Any;

use anyhow::Result;

use crate::application::ports::{HostInspector, HostPorts, RunLock};
use crate::domain::ProvisionError;
use crate::domain::config::{PanelConfig, PlatformConfig};
use crate::domain::platform::{Platform, check_supported, platform_from_os_release};

/// Fail unless the effective user is root.
///
/// # Errors
///
/// Returns [`ProvisionError::NotPrivileged`] for any non-zero uid.
pub fn check_privilege(inspector: &impl HostInspector) -> Result<()> {
    let uid = inspector.effective_uid();
    if uid != 0 {
        return Err(ProvisionError::NotPrivileged { uid }.into());
    }
    Ok(())
}

/// Take the per-host run lock. Held until the returned guard is dropped.
///
/// # Errors
///
/// Returns [`ProvisionError::Locked`] if another run holds the lock.
pub fn lock_host(ports: &impl HostPorts, config: &PanelConfig) -> Result<Box<dyn Any>> {
    let guard = ports.lock().try_lock(&config.lock_path)?;
    tracing::debug!(path = %config.lock_path.display(), "run lock acquired");
    Ok(guard)
}

/// Read and check the platform-identification file.
///
/// # Errors
///
/// Returns [`ProvisionError::PlatformUnreadable`] if the file cannot be read
/// and [`ProvisionError::UnsupportedPlatform`] if neither `ID` nor `ID_LIKE`
/// is allowed.
pub fn detect_platform(inspector: &impl HostInspector, config: &PlatformConfig) -> Result<Platform> {
    let content = inspector
        .read_os_release(&config.os_release_path)
        .map_err(|err| {
            tracing::debug!(error = %format!("{err:#}"), "os-release read failed");
            ProvisionError::PlatformUnreadable {
                path: config.os_release_path.clone(),
            }
        })?;
    let platform = platform_from_os_release(&content);
    check_supported(&platform, &config.allowed_ids)?;
    tracing::info!(id = %platform.id, version = ?platform.version_id, "platform accepted");
    Ok(platform)
}
