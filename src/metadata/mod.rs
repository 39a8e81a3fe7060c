// ABOUTME: Image metadata extraction from `image inspect` output.
// ABOUTME: Parses the JSON array structurally and degrades to a warning on any mismatch.

mod report;

pub use report::{ReportHeader, render_report, write_report};

use crate::check::CheckResult;
use crate::compose::{ContainerSummary, Orchestrator};
use crate::types::ImageRef;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::Path;

const SUBJECT: &str = "image metadata";

/// Selected fields of one inspected image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageMetadata {
    pub repo_tags: Vec<String>,
    pub created: DateTime<FixedOffset>,
    pub os: String,
    pub config: Map<String, Value>,
    pub exposed_ports: BTreeSet<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("inspect output is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("inspect output is a JSON {0}, expected an array of images")]
    NotAnArray(&'static str),

    #[error("inspect output contains no images")]
    Empty,

    #[error("image object is missing expected fields: {0}")]
    Shape(#[source] serde_json::Error),

    #[error("cannot write report: {0}")]
    Write(#[source] std::io::Error),

    #[error("invalid Created timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectedImage {
    #[serde(default)]
    repo_tags: Option<Vec<String>>,
    created: String,
    os: String,
    #[serde(default)]
    config: Option<Map<String, Value>>,
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parse `image inspect` output: a JSON array whose first element describes the image.
pub fn parse_inspect(payload: &str) -> Result<ImageMetadata, MetadataError> {
    let value: Value = serde_json::from_str(payload)?;
    let images = match value {
        Value::Array(images) => images,
        other => return Err(MetadataError::NotAnArray(json_kind(&other))),
    };

    if images.len() > 1 {
        tracing::debug!("inspect returned {} images, using the first", images.len());
    }
    let first = images.into_iter().next().ok_or(MetadataError::Empty)?;
    let image: InspectedImage = serde_json::from_value(first).map_err(MetadataError::Shape)?;

    let created = DateTime::parse_from_rfc3339(&image.created).map_err(|source| {
        MetadataError::Timestamp {
            value: image.created.clone(),
            source,
        }
    })?;

    let config = image.config.unwrap_or_default();
    let exposed_ports = config
        .get("ExposedPorts")
        .and_then(Value::as_object)
        .map(|ports| ports.keys().cloned().collect())
        .unwrap_or_default();

    Ok(ImageMetadata {
        repo_tags: image.repo_tags.unwrap_or_default(),
        created,
        os: image.os,
        config,
        exposed_ports,
    })
}

/// First running container built from `image`.
pub fn find_container<'a>(
    containers: &'a [ContainerSummary],
    image: &ImageRef,
) -> Option<&'a ContainerSummary> {
    containers.iter().find(|c| image.matches(&c.image))
}

/// Inspect the proxy container's image and write the metadata report.
///
/// Never fails the run: every problem becomes a WARN result.
pub async fn extract_metadata<O: Orchestrator + ?Sized>(
    orchestrator: &O,
    containers: &[ContainerSummary],
    image: &ImageRef,
    report_path: &Path,
) -> CheckResult {
    let Some(container) = find_container(containers, image) else {
        return CheckResult::warn(
            SUBJECT,
            format!("no running container uses image {}", image.name()),
        );
    };

    let payload = match orchestrator.inspect_image(&container.image).await {
        Ok(payload) => payload,
        Err(e) => return CheckResult::warn(SUBJECT, format!("inspect failed: {e}")),
    };

    let metadata = match parse_inspect(&payload) {
        Ok(metadata) => metadata,
        Err(e) => return CheckResult::warn(SUBJECT, e.to_string()),
    };

    let header = ReportHeader::for_container(container);
    match write_report(report_path, &header, &metadata) {
        Ok(()) => CheckResult::ok(
            SUBJECT,
            format!(
                "{} ({}) written to {}",
                container.image,
                metadata.repo_tags.join(", "),
                report_path.display()
            ),
        ),
        Err(e) => CheckResult::warn(
            SUBJECT,
            format!("{} ({})", e, report_path.display()),
        ),
    }
}
