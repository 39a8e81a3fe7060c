// ABOUTME: The deployment verifier pipeline.
// ABOUTME: Prerequisites, ports, orchestration, health probes, then image metadata.

use crate::check::{CheckResult, Report};
use crate::compose::{ContainerSummary, Manifest, Orchestrator, Stage};
use crate::config::{CheckMode, Config, FailurePolicy};
use crate::error::{Error, Result};
use crate::metadata;
use crate::output::Output;
use crate::ports;
use crate::prereq;
use crate::probe::{self, ProbeSettings};
use crate::process::CommandError;
use std::ffi::OsString;
use std::path::PathBuf;

/// Runs every verification stage against one manifest directory.
pub struct Verifier<O> {
    config: Config,
    dir: PathBuf,
    orchestrator: O,
    search_path: OsString,
}

impl<O: Orchestrator> Verifier<O> {
    pub fn new(config: Config, dir: impl Into<PathBuf>, orchestrator: O) -> Self {
        Self {
            config,
            dir: dir.into(),
            orchestrator,
            search_path: std::env::var_os("PATH").unwrap_or_default(),
        }
    }

    /// Look tools up in `search_path` instead of `$PATH`.
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = search_path.into();
        self
    }

    pub fn orchestrator(&self) -> &O {
        &self.orchestrator
    }

    /// Run the pipeline. Fatal preconditions return `Err`; everything else lands in the report.
    pub async fn run(&self, output: &Output) -> Result<Report> {
        let mut report = Report::default();
        let record = |report: &mut Report, results: Vec<CheckResult>| {
            for result in results {
                output.check(&result);
                report.record(result);
            }
        };

        output.progress("→ Checking prerequisites...");
        tracing::info!("Checking {} tool(s)", self.config.tools.len());
        let tools = prereq::check_prerequisites(
            &self.config.tools,
            &self.search_path,
            self.config.command_timeout,
        )
        .await?;
        record(&mut report, tools);

        output.progress(&format!("→ Checking ports ({})...", self.config.mode));
        let port_results =
            ports::check_ports(self.config.mode, &self.config.endpoints, self.config.timeout)
                .await?;
        record(&mut report, port_results);

        let manifest = Manifest::discover(&self.dir)?;
        tracing::info!("Using manifest {}", manifest.path().display());

        if self.config.mode == CheckMode::Preflight {
            output.progress(&format!(
                "→ Building services from {}...",
                manifest.path().display()
            ));
            let build = self.orchestrate(Stage::Build, &manifest).await?;
            record(&mut report, vec![build]);

            output.progress("→ Starting services...");
            let up = self.orchestrate(Stage::Up, &manifest).await?;
            record(&mut report, vec![up]);
        }

        output.progress("→ Listing images and containers...");
        let (listing, containers) = self.list(output).await;
        record(&mut report, listing);

        output.progress("→ Probing service health...");
        let settings = ProbeSettings {
            timeout: self.config.timeout,
            retry: self.config.retry.clone(),
        };
        let health = probe::probe_endpoints(&self.config.endpoints, &settings).await;
        record(&mut report, health);

        output.progress("→ Extracting image metadata...");
        let extracted = match containers {
            Some(containers) => {
                metadata::extract_metadata(
                    &self.orchestrator,
                    &containers,
                    &self.config.proxy_image,
                    &self.config.report_path(&self.dir),
                )
                .await
            }
            None => CheckResult::warn("image metadata", "container list unavailable"),
        };
        record(&mut report, vec![extracted]);

        Ok(report)
    }

    /// Run `build` or `up`, applying the failure policy to errors.
    async fn orchestrate(&self, stage: Stage, manifest: &Manifest) -> Result<CheckResult> {
        let outcome = match stage {
            Stage::Build => self.orchestrator.build(manifest).await,
            Stage::Up => self.orchestrator.up(manifest).await,
        };
        let subject = format!("compose {stage}");

        match (outcome, self.config.policy) {
            (Ok(()), _) => Ok(CheckResult::ok(subject, "succeeded")),
            (Err(source), FailurePolicy::FailFast) => Err(Error::Orchestration { stage, source }),
            (Err(e), FailurePolicy::BestEffort) => {
                tracing::warn!("compose {} failed, continuing: {}", stage, e);
                Ok(CheckResult::fail(subject, e.to_string()))
            }
        }
    }

    /// List images and containers. Listing problems only warn.
    async fn list(&self, output: &Output) -> (Vec<CheckResult>, Option<Vec<ContainerSummary>>) {
        let mut results = Vec::new();

        match self.orchestrator.images().await {
            Ok(images) => {
                for image in &images {
                    output.progress(&format!("    image {} ({})", image.reference(), image.size));
                }
                results.push(CheckResult::ok("images", format!("{} image(s)", images.len())));
            }
            Err(e) => results.push(listing_warning("images", &e)),
        }

        let containers = match self.orchestrator.containers().await {
            Ok(containers) => {
                for c in &containers {
                    output.progress(&format!(
                        "    container {} [{}] {}",
                        c.names, c.image, c.status
                    ));
                }
                results.push(CheckResult::ok(
                    "containers",
                    format!("{} running", containers.len()),
                ));
                Some(containers)
            }
            Err(e) => {
                results.push(listing_warning("containers", &e));
                None
            }
        };

        (results, containers)
    }
}

fn listing_warning(subject: &str, error: &CommandError) -> CheckResult {
    CheckResult::warn(subject, format!("listing failed: {error}"))
}
