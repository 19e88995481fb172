//! Canonical forms for the path strings and origin records that different
//! ingestion mechanisms attach to a page.

use std::path::{Component, Path, PathBuf};

use regex::Regex;

use crate::config::EditConfig;
use crate::error::Error;
use crate::types::{ComponentInfo, OriginInfo, PageSource, RefHead, RefKind};

/// Compiled path classifiers derived from an [`EditConfig`].
#[derive(Debug, Clone)]
pub struct PathPatterns {
    /// Captures `<repo>` and `<rest>` from `…/<components_root>/<repo>/<rest>`.
    component: Regex,
    /// Matches any path that enters the component tree.
    component_root: Regex,
    /// Fragment that marks contribution-upstream pages.
    contribution_marker: String,
}

impl PathPatterns {
    /// Split a component-tree path into the upstream repository and the
    /// path inside it. Returns `None` for anything else.
    pub fn component_info(&self, value: Option<&str>) -> Option<ComponentInfo> {
        let normalized = normalize_path(value)?;
        let caps = self.component.captures(&normalized)?;
        let repo = caps.get(1)?.as_str().to_string();
        let rel_path = caps.get(2)?.as_str().to_string();
        return Some(ComponentInfo { rel_path, repo });
    }

    /// Whether the path enters the component tree at all, even without a
    /// repository and file below it.
    pub fn is_component_path(&self, value: Option<&str>) -> bool {
        return normalize_path(value).is_some_and(|p| return self.component_root.is_match(&p));
    }

    /// Whether the path belongs to a contribution-upstream page.
    pub fn is_upstream_reference(&self, value: Option<&str>) -> bool {
        return normalize_path(value).is_some_and(|p| return p.contains(self.contribution_marker.as_str()));
    }

    /// Compile the classifiers for the configured layout.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if the generated expression does not compile.
    pub fn new(config: &EditConfig) -> Result<Self, Error> {
        let root = regex::escape(config.components_root.trim_matches('/'));
        let site = regex::escape(config.site_root.trim_matches('/'));
        let prefix = if site.is_empty() {
            format!("(?:^|/){root}/")
        } else {
            format!("(?:^|/)(?:{site}/)?{root}/")
        };
        return Ok(Self {
            component: compile(&format!("{prefix}([^/]+)/(.+)$"))?,
            component_root: compile(&prefix)?,
            contribution_marker: config.contribution_marker.clone(),
        });
    }
}

/// Best absolute filesystem path for a source, in order of trust:
/// `realpath`, then `abspath` (each only when already absolute), then the
/// collector worktree joined with the scanned path.
pub fn absolute_path(src: &PageSource) -> Option<PathBuf> {
    if let Some(real) = non_empty(src.realpath.as_deref())
        && Path::new(real).is_absolute()
    {
        return Some(PathBuf::from(real));
    }
    if let Some(abs) = non_empty(src.abspath.as_deref())
        && Path::new(abs).is_absolute()
    {
        return Some(PathBuf::from(abs));
    }
    let worktree = src.origin.as_ref().and_then(|o| return non_empty(o.collector_worktree.as_deref()));
    if let (Some(worktree), Some(scanned)) = (worktree, normalize_path(src.scanned.as_deref())) {
        return Some(Path::new(worktree).join(scanned));
    }
    return None;
}

/// Collapse `.` and `..` components in a path without touching the filesystem.
/// Preserves leading `..` when there is nothing left to pop.
pub fn collapse_dot_segments(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        push_normalized_component(&mut components, component);
    }
    return components.iter().collect();
}

/// Treat empty strings the same as missing values.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    return value.filter(|v| return !v.is_empty());
}

/// Strip a single leading `./`, then a single leading `/`.
/// Returns `None` for missing or empty input.
pub fn normalize_path(value: Option<&str>) -> Option<String> {
    let raw = non_empty(value)?;
    let without_dot = raw.strip_prefix("./").unwrap_or(raw);
    let without_slash = without_dot.strip_prefix('/').unwrap_or(without_dot);
    return Some(without_slash.to_string());
}

/// Reduce origin metadata to `{head, url}`. A ref without a kind is a plain `ref`.
pub fn origin_info(src: &PageSource) -> OriginInfo {
    let Some(origin) = src.origin.as_ref() else {
        return OriginInfo::default();
    };
    let head = non_empty(origin.refname.as_deref()).map(|name| {
        return RefHead {
            ref_name: name.to_string(),
            ref_type: origin.reftype.as_deref().map_or(RefKind::Ref, RefKind::from_name),
        };
    });
    let url = non_empty(origin.url.as_deref()).map(str::to_string);
    return OriginInfo { head, url };
}

/// Render a relative path with `/` separators regardless of platform.
pub fn path_to_slash(path: &Path) -> String {
    return path
        .components()
        .map(|c| return c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
}

/// Handle a single path component during normalization.
/// Pops the last component for `..` when possible, preserves it otherwise.
fn push_normalized_component<'a>(components: &mut Vec<Component<'a>>, component: Component<'a>) {
    match component {
        Component::CurDir => {},
        Component::ParentDir => {
            let can_pop = matches!(components.last(), Some(Component::Normal(_)));
            if can_pop {
                components.pop();
            } else if !matches!(components.last(), Some(Component::RootDir | Component::Prefix(_))) {
                components.push(component);
            }
        },
        other => components.push(other),
    }
    return;
}

/// Compile one generated expression.
///
/// # Errors
///
/// Returns `Error::InvalidPattern` on compile failure.
fn compile(pattern: &str) -> Result<Regex, Error> {
    return Regex::new(pattern).map_err(|e| {
        return Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        };
    });
}
