//! Provisioning steps and the run report.

use std::fmt;

use serde::Serialize;

/// Provisioning steps, in the only order they ever run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    PrivilegeCheck,
    OsDetection,
    Dependencies,
    Runtimes,
    Artifact,
    Service,
    Frontend,
    Proxy,
}

impl Step {
    pub const ALL: [Step; 8] = [
        Step::PrivilegeCheck,
        Step::OsDetection,
        Step::Dependencies,
        Step::Runtimes,
        Step::Artifact,
        Step::Service,
        Step::Frontend,
        Step::Proxy,
    ];

    /// One-based position in [`Step::ALL`].
    #[must_use]
    pub fn number(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).map_or(0, |i| i + 1)
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Step::PrivilegeCheck => "privilege check",
            Step::OsDetection => "OS detection",
            Step::Dependencies => "dependency installation",
            Step::Runtimes => "runtime installation",
            Step::Artifact => "artifact acquisition",
            Step::Service => "service registration",
            Step::Frontend => "frontend bring-up",
            Step::Proxy => "proxy configuration",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Outcome of a provisioning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    pub success: bool,
    pub failed_step: Option<Step>,
    pub message: String,
}

impl ProvisionReport {
    #[must_use]
    pub fn completed() -> Self {
        Self {
            success: true,
            failed_step: None,
            message: "host provisioned".to_string(),
        }
    }

    /// Failed report; `error` is rendered with its full context chain.
    #[must_use]
    pub fn failed(step: Step, error: &anyhow::Error) -> Self {
        Self {
            success: false,
            failed_step: Some(step),
            message: format!("{error:#}"),
        }
    }
}
