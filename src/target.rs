//! Target resolution: turn one page's source metadata into the repository,
//! ref and path its edit link should point at.

use std::path::Path;

use crate::config::EditConfig;
use crate::normalize::{self, PathPatterns};
use crate::repo_root;
use crate::types::{PageSource, RefHead, ResolutionContext, ResolutionTarget};

/// Rules in precedence order. The last one always applies.
const RULES: [Rule; 3] = [component_rule, upstream_rule, default_rule];

/// A single precedence rule. Returns `None` when it does not apply.
type Rule = fn(&ResolutionContext, &EditConfig, &PathPatterns) -> Option<ResolutionTarget>;

/// Gather everything the rules need from a page source.
pub fn collect_context(src: &PageSource, config: &EditConfig, patterns: &PathPatterns) -> ResolutionContext {
    let abs_path = normalize::absolute_path(src).map(|p| return normalize::collapse_dot_segments(&p));
    let repo_root = abs_path
        .as_deref()
        .and_then(|p| return repo_root::find_repo_root(p, &config.repo_marker));
    let scanned = normalize::normalize_path(src.scanned.as_deref());
    let component = patterns.component_info(scanned.as_deref());
    let rel_path = resolve_relative_path(src, abs_path.as_deref(), repo_root.as_deref(), patterns);
    return ResolutionContext {
        component,
        origin: normalize::origin_info(src),
        rel_path,
    };
}

/// Map floating refs (`latest`, `HEAD` in any case) to the main branch and
/// keep every concrete branch or tag as-is.
pub fn resolve_default_head(head: Option<&RefHead>, config: &EditConfig) -> Option<RefHead> {
    let head = head?;
    if head.ref_name.eq_ignore_ascii_case("latest") || head.ref_name.eq_ignore_ascii_case("head") {
        return Some(config.main_ref());
    }
    return Some(head.clone());
}

/// Pick the most trustworthy relative path:
/// repository-relative path of the absolute file, then the scanned path
/// (unless it lives in the component tree), then `relative`, then `path`.
pub fn resolve_relative_path(
    src: &PageSource,
    abs_path: Option<&Path>,
    repo_root: Option<&Path>,
    patterns: &PathPatterns,
) -> Option<String> {
    if let (Some(abs), Some(root)) = (abs_path, repo_root)
        && let Ok(relative) = abs.strip_prefix(root)
    {
        return Some(normalize::path_to_slash(relative));
    }

    if let Some(scanned) = normalize::normalize_path(src.scanned.as_deref()) {
        // Component pages are remapped upstream; their scan path is never a docs-repo path.
        if patterns.is_component_path(Some(&scanned)) {
            return None;
        }
        return Some(scanned);
    }

    return normalize::normalize_path(src.relative.as_deref())
        .or_else(|| return normalize::normalize_path(src.path.as_deref()));
}

/// Run the rules in order and return the first target produced.
pub fn resolve_target(context: &ResolutionContext, config: &EditConfig, patterns: &PathPatterns) -> ResolutionTarget {
    return RULES
        .iter()
        .find_map(|rule| return rule(context, config, patterns))
        .unwrap_or_default();
}

/// Pages copied into the component tree always edit the upstream repository on main.
fn component_rule(
    context: &ResolutionContext,
    config: &EditConfig,
    _patterns: &PathPatterns,
) -> Option<ResolutionTarget> {
    let component = context.component.as_ref()?;
    return Some(ResolutionTarget {
        head: Some(config.main_ref()),
        rel_path: Some(component.rel_path.clone()),
        remote_url: Some(config.component_remote(&component.repo)),
    });
}

/// Everything else: the page's own origin, with floating refs pinned to main.
fn default_rule(
    context: &ResolutionContext,
    config: &EditConfig,
    _patterns: &PathPatterns,
) -> Option<ResolutionTarget> {
    return Some(ResolutionTarget {
        head: resolve_default_head(context.origin.head.as_ref(), config),
        rel_path: context.rel_path.clone(),
        remote_url: context.origin.url.clone(),
    });
}

/// Contribution-upstream pages live in the docs repository and are edited on main.
fn upstream_rule(
    context: &ResolutionContext,
    config: &EditConfig,
    patterns: &PathPatterns,
) -> Option<ResolutionTarget> {
    if !patterns.is_upstream_reference(context.rel_path.as_deref()) {
        return None;
    }
    return Some(ResolutionTarget {
        head: Some(config.main_ref()),
        rel_path: context.rel_path.clone(),
        remote_url: context.origin.url.clone(),
    });
}
