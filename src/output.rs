// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use crate::check::{CheckResult, Report, Status, StatusCounts};
use serde::Serialize;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Only problems and the final summary
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print one check result. Quiet mode only shows problems.
    pub fn check(&self, result: &CheckResult) {
        match self.mode {
            OutputMode::Normal => println!("  {result}"),
            OutputMode::Quiet => {
                if result.status() != Status::Ok {
                    println!("{result}");
                }
            }
            OutputMode::Json => {
                let event = JsonEvent::Check { result };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }

    /// Print the closing line for a completed run.
    pub fn summary(&self, report: &Report) {
        let counts = report.counts();
        let worst = report.worst();
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                let verdict = match worst {
                    Status::Ok => "Deployment verified",
                    Status::Warn => "Deployment verified with warnings",
                    Status::Fail => "Deployment has failing checks",
                };
                let line = format!(
                    "{verdict}: {} ok, {} warn, {} fail",
                    counts.ok, counts.warn, counts.fail
                );
                let elapsed = self.elapsed_secs();
                if self.mode == OutputMode::Normal && elapsed > 0.0 {
                    println!("{line} ({:.1}s)", elapsed);
                } else {
                    println!("{line}");
                }
            }
            OutputMode::Json => {
                let event = JsonEvent::Summary {
                    status: worst,
                    counts,
                    exit_code: report.exit_code(),
                    duration_secs: self.duration(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonEvent::Error {
                    message,
                    duration_secs: self.duration(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum JsonEvent<'a> {
    Check {
        #[serde(flatten)]
        result: &'a CheckResult,
    },
    Summary {
        status: Status,
        counts: StatusCounts,
        exit_code: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_secs: Option<f64>,
    },
    Error {
        message: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_secs: Option<f64>,
    },
}
