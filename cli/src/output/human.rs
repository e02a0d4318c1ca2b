//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;

use crate::application::services::plan::{PlannedFile, ProvisionPlan};
use crate::domain::artifact::ArtifactSource;
use crate::domain::manifest::RuntimeInstaller;
use crate::output::OutputContext;

/// Renders plans and versions as human-readable terminal output.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("mimipanel {version}");
    }

    /// Render a dry-run plan.
    pub fn render_plan(&self, plan: &ProvisionPlan) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.header(&format!("{} provisioning plan", plan.product));
        self.ctx.kv("install dir:", &plan.install_dir.display().to_string());
        self.ctx.kv("artifact:", &artifact_summary(&plan.artifact));

        println!();
        self.ctx.header("Steps");
        for step in &plan.steps {
            println!("  {}. {}", step.number, step.title);
        }

        println!();
        self.ctx.header("Packages");
        for set in &plan.packages {
            self.ctx.kv(&format!("{}:", set.name), &set.packages.join(" "));
        }

        println!();
        self.ctx.header("Runtimes");
        for runtime in &plan.runtimes {
            let source = match &runtime.installer {
                RuntimeInstaller::Archive { url, .. } | RuntimeInstaller::Script { url, .. } => {
                    url.as_str()
                }
            };
            self.ctx.kv(&format!("{}:", runtime.name), source);
            if !runtime.global_packages.is_empty() {
                self.ctx
                    .kv("  npm -g:", &runtime.global_packages.join(" "));
            }
        }

        for file in [&plan.service_unit, &plan.frontend_env, &plan.proxy_site] {
            println!();
            self.render_file(file);
        }

        if !plan.warnings.is_empty() {
            println!();
            for warning in &plan.warnings {
                self.ctx.warn(warning);
            }
        }
    }

    fn render_file(&self, file: &PlannedFile) {
        if self.ctx.quiet {
            return;
        }
        println!("{}", file.path.display().style(self.ctx.out.file));
        for line in file.content.lines() {
            println!("  {}", line.style(self.ctx.out.muted));
        }
    }
}

/// One-line description of where the artifact comes from.
#[must_use]
pub fn artifact_summary(artifact: &ArtifactSource) -> String {
    match artifact {
        ArtifactSource::Prebuilt { url, sha256 } => match sha256 {
            Some(_) => format!("prebuilt {url} (sha256 pinned)"),
            None => format!("prebuilt {url}"),
        },
        ArtifactSource::Source {
            repository, branch, ..
        } => match branch {
            Some(b) => format!("source {repository} @ {b}"),
            None => format!("source {repository}"),
        },
    }
}
