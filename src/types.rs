//! Core domain types: catalog records, git refs, and resolution values.

use serde::Serialize;
use serde_json::{Map, Value};

/// Key of the edit URL on a page and on its `src` object.
pub const EDIT_URL_KEY: &str = "editUrl";

/// A page exactly as the catalog stores it. Only [`EDIT_URL_KEY`] is ever
/// written into it and into its `src` object; every other key, `null` and
/// ordering is left as it was read.
pub type PageRecord = Map<String, Value>;

/// Path-derived facts about a page copied into the synthesized component tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInfo {
    /// Path of the page inside the upstream repository.
    pub rel_path: String,
    /// Name of the upstream repository the page was copied from.
    pub repo: String,
}

/// Git origin metadata attached to a page source by its ingestion mechanism.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Origin {
    /// Worktree the collector checked the page out into.
    pub collector_worktree: Option<String>,
    /// Branch or tag name the page was built from.
    pub refname: Option<String>,
    /// Kind of `refname`: `branch`, `tag`, or anything else.
    pub reftype: Option<String>,
    /// Remote URL of the repository the page came from.
    pub url: Option<String>,
}

/// Origin metadata reduced to the two values the resolver consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginInfo {
    /// Ref the page was built from, if any.
    pub head: Option<RefHead>,
    /// Remote URL, if any.
    pub url: Option<String>,
}

/// Read-only view of one catalog page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Edit URL already attached to the page.
    pub edit_url: Option<String>,
    /// Output path of the page, used only in log lines.
    pub path: Option<String>,
    /// Source record supplied by the catalog.
    pub src: Option<PageSource>,
}

/// Per-page source metadata. Every path is optional and any of them may be
/// missing, empty, or produced by a different ingestion mechanism.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSource {
    /// Absolute path candidate reported by the catalog.
    pub abspath: Option<String>,
    /// Edit URL already attached to the source record.
    pub edit_url: Option<String>,
    /// Git origin of the page.
    pub origin: Option<Origin>,
    /// Final fallback path.
    pub path: Option<String>,
    /// Resolved real path on disk.
    pub realpath: Option<String>,
    /// Path relative to the content root.
    pub relative: Option<String>,
    /// Path as seen by the ingestion scanner.
    pub scanned: Option<String>,
}

/// A git ref an edit URL can point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefHead {
    /// Branch or tag name.
    pub ref_name: String,
    /// What kind of ref `ref_name` is.
    pub ref_type: RefKind,
}

/// Kind of a git ref. Unknown kinds collapse into `Ref`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    /// A branch.
    Branch,
    /// Any other ref, including missing kind metadata.
    Ref,
    /// A tag.
    Tag,
}

/// Everything the resolver knows about one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionContext {
    /// Set when the page was synthesized by the component aggregation step.
    pub component: Option<ComponentInfo>,
    /// Normalized origin metadata.
    pub origin: OriginInfo,
    /// Best candidate relative path.
    pub rel_path: Option<String>,
}

/// Repository, ref and file an edit URL should point at. Any part may be
/// missing; completeness is checked before a URL is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionTarget {
    /// Ref to edit against.
    pub head: Option<RefHead>,
    /// Path of the file inside the repository.
    pub rel_path: Option<String>,
    /// Remote URL of the repository.
    pub remote_url: Option<String>,
}

impl RefKind {
    /// Map catalog `reftype` strings onto a kind.
    pub fn from_name(name: &str) -> Self {
        return match name {
            "branch" => RefKind::Branch,
            "tag" => RefKind::Tag,
            _ => RefKind::Ref,
        };
    }
}

impl Origin {
    /// Read the origin fields from a `src.origin` object. The descriptive
    /// spellings (`refName`, `refType`, `remoteUrl`, `collectorWorktreeRoot`)
    /// are consulted when the short ones are missing or empty.
    pub fn from_record(record: &Map<String, Value>) -> Self {
        return Self {
            collector_worktree: text(record, &["collectorWorktree", "collectorWorktreeRoot"]),
            refname: text(record, &["refname", "refName"]),
            reftype: text(record, &["reftype", "refType"]),
            url: text(record, &["url", "remoteUrl"]),
        };
    }
}

impl Page {
    /// Take the view of a catalog page. A `src` that is not an object counts as missing.
    pub fn from_record(record: &PageRecord) -> Self {
        return Self {
            edit_url: text(record, &[EDIT_URL_KEY]),
            path: text(record, &["path"]),
            src: record
                .get("src")
                .and_then(Value::as_object)
                .map(PageSource::from_record),
        };
    }
}

impl PageSource {
    /// Read the source fields from a `src` object, short spellings first.
    pub fn from_record(record: &Map<String, Value>) -> Self {
        return Self {
            abspath: text(record, &["abspath", "absPath"]),
            edit_url: text(record, &[EDIT_URL_KEY]),
            origin: record.get("origin").and_then(Value::as_object).map(Origin::from_record),
            path: text(record, &["path"]),
            realpath: text(record, &["realpath", "realPath"]),
            relative: text(record, &["relative", "relativePath"]),
            scanned: text(record, &["scanned", "scannedPath"]),
        };
    }
}

/// First non-empty string stored under any of `keys`. Other value types,
/// `null` and empty strings count as missing.
fn text(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    return keys
        .iter()
        .filter_map(|key| return record.get(*key).and_then(Value::as_str))
        .find(|value| return !value.is_empty())
        .map(str::to_string);
}
