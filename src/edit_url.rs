//! Completeness validation and GitHub edit-URL assembly.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use serde::Serialize;

use crate::config::EditConfig;
use crate::error::Error;
use crate::types::{RefHead, ResolutionTarget};

/// Characters left as-is inside a path segment; matches `encodeURIComponent`.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A target whose three parts are all present.
#[derive(Debug, Clone, Copy)]
pub struct CompleteTarget<'a> {
    /// Ref to edit against.
    pub head: &'a RefHead,
    /// Path of the file in the repository.
    pub rel_path: &'a str,
    /// Remote URL of the repository.
    pub remote_url: &'a str,
}

/// Builds edit URLs for one hosting provider.
#[derive(Debug, Clone)]
pub struct EditUrlBuilder {
    /// Host name edit URLs are built for.
    host: String,
    /// Accepts `http(s)://<host>/<org>/<repo>[.git]` and `<user>@<host>:<org>/<repo>[.git]`.
    remote: Regex,
}

/// Which parts of a target were missing. Each flag is independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingFields {
    /// No ref could be determined.
    pub head: bool,
    /// No relative path could be determined.
    pub rel_path: bool,
    /// No remote URL could be determined.
    pub remote_url: bool,
}

/// Organization and repository parsed from a remote URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepo {
    /// Owning organization or user.
    pub org: String,
    /// Repository name without `.git`.
    pub repo: String,
}

/// Why a page did not get an edit URL. Never fatal to the build.
/// Serializes as the reason-specific fields of a failure log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(untagged)]
pub enum ResolveFailure {
    /// The target was complete but the remote is not a recognized GitHub remote.
    #[error("Failed to build edit URL")]
    #[serde(rename_all = "camelCase")]
    BuildEditUrlFailed {
        /// Ref of the rejected target.
        head: RefHead,
        /// Path of the rejected target.
        rel_path: String,
        /// Remote that could not be parsed.
        remote_url: String,
    },
    /// One or more of head, remote, and path could not be determined.
    #[error("Incomplete edit URL target")]
    #[serde(rename_all = "camelCase")]
    IncompleteTarget {
        /// Which parts were missing.
        missing: MissingFields,
        /// The partial target as resolved.
        target: ResolutionTarget,
    },
}

impl EditUrlBuilder {
    /// Assemble `https://<host>/<org>/<repo>/edit/<ref>[/<path>]`.
    /// An empty path drops the trailing segment instead of failing.
    /// Returns `None` when the remote is not on the configured host.
    pub fn build(&self, remote_url: &str, head: &RefHead, rel_path: Option<&str>) -> Option<String> {
        let remote = self.parse_remote(remote_url)?;
        let mut url = format!(
            "https://{}/{}/{}/edit/{}",
            self.host,
            remote.org,
            remote.repo,
            encode_git_path(&head.ref_name)
        );
        if let Some(path) = rel_path.filter(|p| return !p.is_empty()) {
            url.push('/');
            url.push_str(&encode_git_path(path));
        }
        return Some(url);
    }

    /// Build the URL for a complete target.
    ///
    /// # Errors
    ///
    /// Returns `ResolveFailure::BuildEditUrlFailed` when the remote is rejected.
    pub fn build_target(&self, target: CompleteTarget<'_>) -> Result<String, ResolveFailure> {
        return self
            .build(target.remote_url, target.head, Some(target.rel_path))
            .ok_or_else(|| {
                return ResolveFailure::BuildEditUrlFailed {
                    head: target.head.clone(),
                    rel_path: target.rel_path.to_string(),
                    remote_url: target.remote_url.to_string(),
                };
            });
    }

    /// Compile the remote matcher for the configured host.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if the generated expression does not compile.
    pub fn new(config: &EditConfig) -> Result<Self, Error> {
        let host = regex::escape(&config.host);
        let pattern = format!(r"^(?:https?://|(?:ssh://)?[^@/\s]+@){host}[/:]([^/]+)/([^/]+?)(?:\.git)?$");
        let remote = Regex::new(&pattern).map_err(|e| {
            return Error::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            };
        })?;
        return Ok(Self {
            host: config.host.clone(),
            remote,
        });
    }

    /// Split a remote URL into organization and repository.
    pub fn parse_remote(&self, remote_url: &str) -> Option<RemoteRepo> {
        let caps = self.remote.captures(remote_url.trim())?;
        let org = caps.get(1)?.as_str().to_string();
        let repo = caps.get(2)?.as_str().to_string();
        return Some(RemoteRepo { org, repo });
    }
}

impl ResolveFailure {
    /// Stable reason code used in log lines.
    pub fn reason(&self) -> &'static str {
        return match self {
            ResolveFailure::BuildEditUrlFailed { .. } => "build_edit_url_failed",
            ResolveFailure::IncompleteTarget { .. } => "incomplete_target",
        };
    }
}

/// Percent-encode each `/`-separated segment and keep the separators.
pub fn encode_git_path(value: &str) -> String {
    return value
        .split('/')
        .map(|segment| return utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/");
}

/// Check that head, remote and path are all present and non-empty.
///
/// # Errors
///
/// Returns `ResolveFailure::IncompleteTarget` naming every missing part.
pub fn require_complete(target: &ResolutionTarget) -> Result<CompleteTarget<'_>, ResolveFailure> {
    let head = target.head.as_ref().filter(|h| return !h.ref_name.is_empty());
    let remote_url = target.remote_url.as_deref().filter(|u| return !u.is_empty());
    let rel_path = target.rel_path.as_deref().filter(|p| return !p.is_empty());

    return match (head, remote_url, rel_path) {
        (Some(head), Some(remote_url), Some(rel_path)) => Ok(CompleteTarget {
            head,
            rel_path,
            remote_url,
        }),
        _ => Err(ResolveFailure::IncompleteTarget {
            missing: MissingFields {
                head: head.is_none(),
                rel_path: rel_path.is_none(),
                remote_url: remote_url.is_none(),
            },
            target: target.clone(),
        }),
    };
}
