//! Frontend runtime environment file.

use std::net::IpAddr;

use crate::domain::config::FrontendConfig;
use crate::domain::proxy::API_PREFIX;

/// Render the `.env` consumed by the frontend build and server.
///
/// IPv6 addresses are bracketed so the URL stays valid.
#[must_use]
pub fn render_env_file(frontend: &FrontendConfig, public_ip: IpAddr) -> String {
    let host = match public_ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => format!("[{v6}]"),
    };
    format!(
        "{}=http://{host}{API_PREFIX}\nPORT={}\n",
        frontend.api_url_var, frontend.port
    )
}
