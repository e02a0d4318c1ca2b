//! Reverse-proxy route table and nginx site rendering.

use crate::domain::config::PanelConfig;

/// Path prefix routed to the backend.
pub const API_PREFIX: &str = "/api";

/// One `location` block: requests under `prefix` go to `upstream`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub prefix: String,
    pub upstream: String,
}

/// Host plus ordered routes, rendered into a single nginx server block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    pub server_name: String,
    pub listen_port: u16,
    pub routes: Vec<Route>,
}

impl RouteTable {
    /// The two fixed routes: `/` to the frontend and `/api` to the backend.
    #[must_use]
    pub fn from_config(config: &PanelConfig) -> Self {
        Self {
            server_name: config.proxy.server_name.clone(),
            listen_port: config.proxy.listen_port,
            routes: vec![
                Route {
                    prefix: "/".to_string(),
                    upstream: format!("127.0.0.1:{}", config.frontend.port),
                },
                Route {
                    prefix: API_PREFIX.to_string(),
                    upstream: format!("127.0.0.1:{}", config.backend.port),
                },
            ],
        }
    }

    /// Upstream that serves `path`, by longest matching prefix (as nginx does).
    #[must_use]
    pub fn upstream_for(&self, path: &str) -> Option<&str> {
        self.routes
            .iter()
            .filter(|r| path.starts_with(&r.prefix))
            .max_by_key(|r| r.prefix.len())
            .map(|r| r.upstream.as_str())
    }
}

/// Render the nginx site for `table`.
#[must_use]
pub fn render_nginx_site(table: &RouteTable) -> String {
    let mut out = String::new();
    out.push_str("# Generated by mimipanel - DO NOT EDIT\n");
    out.push_str("server {\n");
    out.push_str(&format!("    listen {};\n", table.listen_port));
    out.push_str(&format!("    listen [::]:{};\n", table.listen_port));
    out.push_str(&format!("    server_name {};\n", table.server_name));
    out.push_str("    client_max_body_size 64m;\n");
    for route in &table.routes {
        out.push('\n');
        out.push_str(&format!("    location {} {{\n", route.prefix));
        out.push_str(&format!("        proxy_pass http://{};\n", route.upstream));
        out.push_str("        proxy_http_version 1.1;\n");
        out.push_str("        proxy_set_header Upgrade $http_upgrade;\n");
        out.push_str("        proxy_set_header Connection \"upgrade\";\n");
        out.push_str("        proxy_set_header Host $host;\n");
        out.push_str("        proxy_set_header X-Real-IP $remote_addr;\n");
        out.push_str("        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;\n");
        out.push_str("        proxy_set_header X-Forwarded-Proto $scheme;\n");
        out.push_str("    }\n");
    }
    out.push_str("}\n");
    out
}
