// ABOUTME: Check results and their aggregation into a run report.
// ABOUTME: Results are immutable; the run outcome is the worst status seen.

use serde::Serialize;
use std::fmt;

/// Exit status when every check passed.
pub const EXIT_OK: i32 = 0;
/// Exit status when the pipeline finished but some check warned or failed.
pub const EXIT_DEGRADED: i32 = 2;

/// Severity of a single check, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Warn,
    Fail,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Status::Ok => "OK",
            Status::Warn => "WARN",
            Status::Fail => "FAIL",
        })
    }
}

/// Outcome of one check. Fields are private so a result cannot change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    subject: String,
    status: Status,
    detail: String,
}

impl CheckResult {
    pub fn new(subject: impl Into<String>, status: Status, detail: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            status,
            detail: detail.into(),
        }
    }

    pub fn ok(subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(subject, Status::Ok, detail)
    }

    pub fn warn(subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(subject, Status::Warn, detail)
    }

    pub fn fail(subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(subject, Status::Fail, detail)
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:^4}] {}: {}", self.status, self.subject, self.detail)
    }
}

/// Number of results per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub ok: usize,
    pub warn: usize,
    pub fail: usize,
}

/// Ordered collection of every result produced during a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    results: Vec<CheckResult>,
}

impl Report {
    pub fn record(&mut self, result: CheckResult) {
        match result.status() {
            Status::Ok => tracing::debug!("{}", result),
            Status::Warn | Status::Fail => tracing::warn!("{}", result),
        }
        self.results.push(result);
    }

    pub fn extend(&mut self, results: impl IntoIterator<Item = CheckResult>) {
        for result in results {
            self.record(result);
        }
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    /// Worst status recorded; an empty report counts as OK.
    pub fn worst(&self) -> Status {
        self.results
            .iter()
            .map(CheckResult::status)
            .max()
            .unwrap_or(Status::Ok)
    }

    pub fn counts(&self) -> StatusCounts {
        self.results
            .iter()
            .fold(StatusCounts::default(), |mut counts, result| {
                match result.status() {
                    Status::Ok => counts.ok += 1,
                    Status::Warn => counts.warn += 1,
                    Status::Fail => counts.fail += 1,
                }
                counts
            })
    }

    pub fn exit_code(&self) -> i32 {
        match self.worst() {
            Status::Ok => EXIT_OK,
            Status::Warn | Status::Fail => EXIT_DEGRADED,
        }
    }
}
