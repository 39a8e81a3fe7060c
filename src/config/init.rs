// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Writes a commented deploy-verify.yml next to the service manifest.

use std::path::Path;

use crate::error::{Error, Result};

use super::{CONFIG_FILENAME, Config};

pub fn init_config(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let yaml = generate_template_yaml(&Config::default());
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    let mut endpoints = String::new();
    for endpoint in &config.endpoints {
        endpoints.push_str(&format!(
            "  - name: {}\n    port: {}\n    protocol: {}\n",
            endpoint.name, endpoint.port, endpoint.protocol
        ));
        if endpoint.expect_markup {
            endpoints.push_str("    expect_markup: true\n");
        }
    }

    format!(
        r#"# preflight: ports must be free, services are built and started
# postdeploy: services are already running, ports must be bound
mode: {}
# fail-fast aborts when build/up fails; best-effort records it and continues
policy: {}
timeout: {}s
retry:
  attempts: {}
  backoff: {}s
report: {}
proxy_image: {}
runtime: {}
compose: {}
endpoints:
{}"#,
        config.mode,
        config.policy,
        config.timeout.as_secs(),
        config.retry.attempts,
        config.retry.backoff.as_secs(),
        config.report.display(),
        config.proxy_image.name(),
        config.runtime,
        config.compose.iter().cloned().collect::<Vec<_>>().join(" "),
        endpoints
    )
}
