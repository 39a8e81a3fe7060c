// ABOUTME: Prerequisite checker: are the external tools on PATH?
// ABOUTME: Missing required tools are fatal; optional ones may be installed once.

use crate::check::CheckResult;
use crate::config::ToolRequirement;
use crate::error::{Error, Result};
use crate::process;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Locate `name` in the directories of a PATH-style search path.
pub fn find_executable(name: &str, search_path: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_path)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Presence of each tool on the search path.
pub fn probe_tools(tools: &[ToolRequirement], search_path: &OsStr) -> BTreeMap<String, bool> {
    tools
        .iter()
        .map(|tool| {
            let present = find_executable(&tool.name, search_path).is_some();
            (tool.name.clone(), present)
        })
        .collect()
}

/// Check every tool, installing missing optional ones that have an install command.
pub async fn check_prerequisites(
    tools: &[ToolRequirement],
    search_path: &OsStr,
    install_timeout: Duration,
) -> Result<Vec<CheckResult>> {
    let presence = probe_tools(tools, search_path);
    let is_present = |name: &str| presence.get(name).copied().unwrap_or(false);

    let missing_required: Vec<String> = tools
        .iter()
        .filter(|tool| tool.required && !is_present(&tool.name))
        .map(|tool| tool.name.clone())
        .collect();
    if !missing_required.is_empty() {
        return Err(Error::MissingTool(missing_required));
    }

    let mut results = Vec::with_capacity(tools.len());
    for tool in tools {
        if is_present(&tool.name) {
            results.push(CheckResult::ok(
                format!("tool {}", tool.name),
                "found on PATH",
            ));
            continue;
        }

        match &tool.install {
            Some(command) => {
                install(tool, command, search_path, install_timeout).await?;
                results.push(CheckResult::ok(
                    format!("tool {}", tool.name),
                    "installed",
                ));
            }
            None => results.push(CheckResult::warn(
                format!("tool {}", tool.name),
                "not found on PATH (optional)",
            )),
        }
    }

    Ok(results)
}

async fn install(
    tool: &ToolRequirement,
    command: &[String],
    search_path: &OsStr,
    timeout: Duration,
) -> Result<()> {
    let install_failed = |reason: String| Error::ToolInstallFailed {
        tool: tool.name.clone(),
        reason,
    };

    let (program, args) = command
        .split_first()
        .ok_or_else(|| install_failed("install command is empty".to_string()))?;

    tracing::info!("{} not found, installing with `{}`", tool.name, command.join(" "));
    process::run(program, args, None, timeout)
        .await
        .map_err(|e| install_failed(e.to_string()))?;

    if find_executable(&tool.name, search_path).is_none() {
        return Err(install_failed(
            "install command succeeded but the tool is still not on PATH".to_string(),
        ));
    }

    Ok(())
}
