// ABOUTME: Line-oriented metadata report file.
// ABOUTME: A commented header followed by one line per field and the indented config block.

use super::{ImageMetadata, MetadataError};
use crate::compose::ContainerSummary;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::path::Path;

/// Where and when the report was produced.
#[derive(Debug, Clone)]
pub struct ReportHeader {
    pub host: String,
    pub container: String,
    pub generated: DateTime<Utc>,
}

impl ReportHeader {
    pub fn for_container(container: &ContainerSummary) -> Self {
        Self {
            host: gethostname::gethostname().to_string_lossy().to_string(),
            container: format!("{} ({})", container.names, container.id),
            generated: Utc::now(),
        }
    }
}

fn or_none(values: Vec<&str>) -> String {
    if values.is_empty() {
        "(none)".to_string()
    } else {
        values.join(", ")
    }
}

pub fn render_report(
    header: &ReportHeader,
    metadata: &ImageMetadata,
) -> Result<String, MetadataError> {
    let config = serde_json::to_string_pretty(&Value::Object(metadata.config.clone()))?;

    let mut out = format!(
        "# deploy-verify image metadata\n\
         # host: {}\n\
         # container: {}\n\
         # generated: {}\n\
         RepoTags: {}\n\
         Created: {}\n\
         Os: {}\n\
         ExposedPorts: {}\n\
         Config:\n",
        header.host,
        header.container,
        header.generated.to_rfc3339_opts(SecondsFormat::Secs, true),
        or_none(metadata.repo_tags.iter().map(String::as_str).collect()),
        metadata.created.to_rfc3339(),
        metadata.os,
        or_none(metadata.exposed_ports.iter().map(String::as_str).collect()),
    );
    for line in config.lines() {
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }

    Ok(out)
}

/// Render and write the report, replacing any previous file.
pub fn write_report(
    path: &Path,
    header: &ReportHeader,
    metadata: &ImageMetadata,
) -> Result<(), MetadataError> {
    let content = render_report(header, metadata)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(MetadataError::Write)?;
    }
    std::fs::write(path, content).map_err(MetadataError::Write)?;
    tracing::info!("Wrote image metadata to {}", path.display());
    Ok(())
}
