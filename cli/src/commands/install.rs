//! `mimipanel install`: provision this host.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::provision::provision;
use crate::domain::HostEnv;

/// Run `mimipanel install`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or any step aborts.
/// The message of an aborted run is `<step>: <cause>`.
pub async fn run(app: &AppContext) -> Result<()> {
    let config = app.load_config()?;
    let ports = app.system_ports(&config);
    let env = HostEnv::from_path_var(std::env::var("PATH").ok().as_deref());
    let reporter = app.terminal_reporter();

    app.output.header(&format!("Provisioning {}", config.product));
    let report = provision(&ports, &config, &env, &reporter).await;

    match report.failed_step {
        None => {
            app.output.success(&report.message);
            Ok(())
        }
        Some(step) => anyhow::bail!("{step}: {}", report.message),
    }
}
