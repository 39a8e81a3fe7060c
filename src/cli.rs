// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Flags override values from deploy-verify.yml.

use clap::{Args, Parser, Subcommand};
use deploy_verify::config::{CheckMode, FailurePolicy};
use deploy_verify::output::OutputMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deploy-verify")]
#[command(about = "Build, start and health-check a compose deployment")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub verify: VerifyArgs,

    /// Minimal output (only problems and the summary)
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Emit JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Directory containing the service manifest
    #[arg(short, long, global = true, default_value = ".")]
    pub dir: PathBuf,

    /// Config file (default: deploy-verify.yml in --dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Treat bound ports as conflicts (preflight) or as liveness (postdeploy)
    #[arg(short, long, value_enum)]
    pub mode: Option<CheckMode>,

    /// What to do when build or start fails
    #[arg(long, value_enum)]
    pub policy: Option<FailurePolicy>,

    /// Per-probe timeout in seconds
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Metadata report path (relative paths resolve against --dir)
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Image whose container is inspected for the metadata report
    #[arg(long)]
    pub proxy_image: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a deploy-verify.yml template into --dir
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }
}
