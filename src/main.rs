// ABOUTME: Entry point for the deploy-verify CLI application.
// ABOUTME: Parses arguments, runs the verifier and maps the outcome to an exit status.

mod cli;

use clap::Parser;
use cli::{Cli, Commands, VerifyArgs};
use deploy_verify::Verifier;
use deploy_verify::compose::ComposeCli;
use deploy_verify::config::{self, Config};
use deploy_verify::error::{Error, Result};
use deploy_verify::output::Output;
use deploy_verify::types::ImageRef;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut output = Output::new(cli.output_mode());

    let code = match run(cli, &mut output).await {
        Ok(code) => code,
        Err(e) => {
            output.error(&e.to_string());
            e.exit_code()
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli, output: &mut Output) -> Result<i32> {
    match cli.command {
        Some(Commands::Init { force }) => {
            config::init_config(&cli.verify.dir, force)?;
            output.progress(&format!(
                "Wrote {}",
                cli.verify.dir.join(config::CONFIG_FILENAME).display()
            ));
            Ok(0)
        }
        None => verify(&cli.verify, output).await,
    }
}

async fn verify(args: &VerifyArgs, output: &mut Output) -> Result<i32> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::discover(&args.dir)?,
    };
    let config = apply_overrides(config, args)?;

    output.start_timer();
    output.progress(&format!(
        "Verifying deployment in {} ({} mode, {})",
        args.dir.display(),
        config.mode,
        config.policy
    ));

    let orchestrator = ComposeCli::from_config(&config);
    let verifier = Verifier::new(config, &args.dir, orchestrator);
    let report = verifier.run(output).await?;

    output.summary(&report);
    Ok(report.exit_code())
}

/// Command-line flags take precedence over the config file.
fn apply_overrides(mut config: Config, args: &VerifyArgs) -> Result<Config> {
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(policy) = args.policy {
        config.policy = policy;
    }
    if let Some(secs) = args.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(ref report) = args.report {
        config.report = report.clone();
    }
    if let Some(ref image) = args.proxy_image {
        config.proxy_image =
            ImageRef::parse(image).map_err(|e| Error::InvalidConfig(e.to_string()))?;
    }

    config.validate()?;
    Ok(config)
}
