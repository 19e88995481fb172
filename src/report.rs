//! Build-log lines: one prefixed JSON object per resolved or failed page.

use serde::Serialize;

use crate::edit_url::ResolveFailure;
use crate::normalize::non_empty;
use crate::types::PageSource;

/// Prefix of failure lines, written to stderr.
pub const ERROR_PREFIX: &str = "[edit-url:error] ";

/// Prefix of success lines, written to stdout.
pub const LOG_PREFIX: &str = "[edit-url] ";

/// Stage name reported in every failure line.
const STAGE: &str = "resolveEditUrl";

/// Writes build-log lines to the console.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleRecorder;

/// A page that did not get an edit URL.
#[allow(clippy::arbitrary_source_item_ordering, reason = "field order is the log line's key order")]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureEntry<'a> {
    /// Always `resolveEditUrl`.
    pub stage: &'static str,
    /// `incomplete_target` or `build_edit_url_failed`.
    pub reason: &'static str,
    /// Best human-readable path of the page.
    pub source_path: String,
    /// Reason-specific fields.
    #[serde(flatten)]
    pub failure: &'a ResolveFailure,
    /// Short description of the failure.
    pub error: String,
    /// Kept for log-shape compatibility; there is no stack to report.
    pub stack: Option<String>,
}

/// Receives build-log entries as pages are processed.
pub trait Recorder {
    /// Record a page that did not get an edit URL.
    fn failure(&mut self, entry: &FailureEntry<'_>);
    /// Record a page that got an edit URL.
    fn success(&mut self, entry: &SuccessEntry<'_>);
}

/// A page that got an edit URL.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessEntry<'a> {
    /// The URL attached to the page.
    pub edit_url: &'a str,
    /// Best human-readable path of the page.
    pub path: String,
}

impl<'a> FailureEntry<'a> {
    /// Describe a failed page.
    pub fn new(failure: &'a ResolveFailure, source_path: String) -> Self {
        return Self {
            stage: STAGE,
            reason: failure.reason(),
            source_path,
            failure,
            error: failure.to_string(),
            stack: None,
        };
    }
}

impl Recorder for ConsoleRecorder {
    fn failure(&mut self, entry: &FailureEntry<'_>) {
        if let Some(line) = render_failure(entry) {
            eprintln!("{line}");
        }
    }

    fn success(&mut self, entry: &SuccessEntry<'_>) {
        if let Some(line) = render_success(entry) {
            println!("{line}");
        }
    }
}

/// Collects rendered lines instead of printing them.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    /// Rendered failure lines, in order.
    pub errors: Vec<String>,
    /// Rendered success lines, in order.
    pub logs: Vec<String>,
}

#[cfg(test)]
impl MemoryRecorder {
    /// Parse the JSON payload of the first failure line.
    pub fn first_error(&self) -> serde_json::Value {
        let line = self.errors.first().unwrap();
        return serde_json::from_str(line.strip_prefix(ERROR_PREFIX).unwrap()).unwrap();
    }

    /// Parse the JSON payload of the first success line.
    pub fn first_log(&self) -> serde_json::Value {
        let line = self.logs.first().unwrap();
        return serde_json::from_str(line.strip_prefix(LOG_PREFIX).unwrap()).unwrap();
    }
}

#[cfg(test)]
impl Recorder for MemoryRecorder {
    fn failure(&mut self, entry: &FailureEntry<'_>) {
        self.errors.extend(render_failure(entry));
    }

    fn success(&mut self, entry: &SuccessEntry<'_>) {
        self.logs.extend(render_success(entry));
    }
}

/// First non-empty of the source path, the page path, the scanned path and
/// the relative path, or `unknown`.
pub fn log_path(src: &PageSource, page_path: Option<&str>) -> String {
    let found = non_empty(src.path.as_deref())
        .or_else(|| return non_empty(page_path))
        .or_else(|| return non_empty(src.scanned.as_deref()))
        .or_else(|| return non_empty(src.relative.as_deref()));
    return found.unwrap_or("unknown").to_string();
}

/// Render a failure as a prefixed JSON line. `None` if serialization fails.
pub fn render_failure(entry: &FailureEntry<'_>) -> Option<String> {
    return serde_json::to_string(entry)
        .ok()
        .map(|json| return format!("{ERROR_PREFIX}{json}"));
}

/// Render a success as a prefixed JSON line. `None` if serialization fails.
pub fn render_success(entry: &SuccessEntry<'_>) -> Option<String> {
    return serde_json::to_string(entry)
        .ok()
        .map(|json| return format!("{LOG_PREFIX}{json}"));
}
