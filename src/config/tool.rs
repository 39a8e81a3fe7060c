// ABOUTME: External tool requirements for the prerequisite check.
// ABOUTME: Required tools abort the run when missing; optional ones may be installed.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ToolRequirement {
    pub name: String,

    #[serde(default = "default_required")]
    pub required: bool,

    /// Command that installs the tool when it is missing.
    #[serde(default)]
    pub install: Option<Vec<String>>,
}

fn default_required() -> bool {
    true
}

impl ToolRequirement {
    pub fn required(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: true,
            install: None,
        }
    }

    pub fn optional(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: false,
            install: None,
        }
    }

    pub fn installed_by(mut self, command: &[&str]) -> Self {
        self.install = Some(command.iter().map(|s| s.to_string()).collect());
        self
    }
}

/// Container runtime, orchestration CLI, HTTP client and JSON processor.
pub fn default_tools() -> Vec<ToolRequirement> {
    vec![
        ToolRequirement::required("docker"),
        ToolRequirement::required("docker-compose"),
        ToolRequirement::optional("curl"),
        ToolRequirement::optional("jq").installed_by(&["sudo", "apt-get", "install", "-y", "jq"]),
    ]
}
