//! Content catalog persistence and the per-page edit-URL pass.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::EditConfig;
use crate::edit_url::{self, EditUrlBuilder, ResolveFailure};
use crate::error::Error;
use crate::normalize::PathPatterns;
use crate::report::{self, FailureEntry, Recorder, SuccessEntry};
use crate::target;
use crate::types::{EDIT_URL_KEY, Page, PageRecord, PageSource};

/// Counts of what happened to each page in one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    /// Pages that could not be resolved.
    pub failed: usize,
    /// Pages that received an edit URL.
    pub resolved: usize,
    /// Pages left untouched (existing edit URL or no source record).
    pub skipped: usize,
}

/// The pages of a content catalog, stored as a JSON array of objects.
/// Pages are kept as read so a rewrite only adds edit URLs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Catalog {
    /// Pages in catalog order.
    pub pages: Vec<PageRecord>,
}

/// Resolves edit URLs for page sources under one configuration.
#[derive(Debug, Clone)]
pub struct EditUrlResolver {
    /// Remote parser and URL assembler.
    builder: EditUrlBuilder,
    /// Organization, branch and layout settings.
    config: EditConfig,
    /// Component and contribution path classifiers.
    patterns: PathPatterns,
}

/// What happened to a single page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Resolution failed and was logged.
    Failed,
    /// An edit URL was attached.
    Resolved,
    /// Nothing was done and nothing was logged.
    Skipped,
}

impl Catalog {
    /// Parse a catalog from JSON content.
    ///
    /// # Errors
    ///
    /// Returns `Error::CatalogCorrupt` if the content is not a JSON array of objects.
    pub fn parse(content: &str, path: &Path) -> Result<Self, Error> {
        return serde_json::from_str(content).map_err(|e| {
            return Error::CatalogCorrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            };
        });
    }

    /// Read and parse a catalog from disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::CatalogNotFound` if the file doesn't exist,
    /// `Error::Io` for other read failures,
    /// or `Error::CatalogCorrupt` if the content is not a catalog.
    pub fn read(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::CatalogNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(&content, path);
    }

    /// Write the catalog to disk as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails,
    /// or `Error::Io` if the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<(), Error> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        std::fs::write(path, content)?;
        return Ok(());
    }
}

impl EditUrlResolver {
    /// Compile the path and remote matchers for `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if a configured fragment yields an invalid matcher.
    pub fn new(config: EditConfig) -> Result<Self, Error> {
        return Ok(Self {
            builder: EditUrlBuilder::new(&config)?,
            patterns: PathPatterns::new(&config)?,
            config,
        });
    }

    /// Gather context, pick a target, check it is complete, and build the URL.
    ///
    /// # Errors
    ///
    /// Returns `ResolveFailure::IncompleteTarget` when head, remote or path is
    /// missing, or `ResolveFailure::BuildEditUrlFailed` when the remote is not
    /// a recognized GitHub remote.
    pub fn resolve(&self, src: &PageSource) -> Result<String, ResolveFailure> {
        let context = target::collect_context(src, &self.config, &self.patterns);
        let resolved = target::resolve_target(&context, &self.config, &self.patterns);
        let complete = edit_url::require_complete(&resolved)?;
        return self.builder.build_target(complete);
    }
}

/// Resolve every page in order. Failures never stop the pass.
pub fn apply_edit_urls(
    pages: &mut [PageRecord],
    resolver: &EditUrlResolver,
    recorder: &mut dyn Recorder,
) -> ApplySummary {
    let mut summary = ApplySummary::default();
    for page in pages {
        match set_edit_url(page, resolver, recorder) {
            PageOutcome::Failed => summary.failed = summary.failed.saturating_add(1),
            PageOutcome::Resolved => summary.resolved = summary.resolved.saturating_add(1),
            PageOutcome::Skipped => summary.skipped = summary.skipped.saturating_add(1),
        }
    }
    return summary;
}

/// Attach an edit URL to the page and its `src` object, unless either
/// already carries one. Logs the URL on success and the reason on failure.
/// Nothing but the two `editUrl` keys is ever written.
pub fn set_edit_url(record: &mut PageRecord, resolver: &EditUrlResolver, recorder: &mut dyn Recorder) -> PageOutcome {
    let page = Page::from_record(record);
    let Some(src) = page.src.as_ref() else {
        return PageOutcome::Skipped;
    };
    if page.edit_url.is_some() || src.edit_url.is_some() {
        return PageOutcome::Skipped;
    }

    match resolver.resolve(src) {
        Err(failure) => {
            recorder.failure(&FailureEntry::new(&failure, report::log_path(src, None)));
            return PageOutcome::Failed;
        },
        Ok(url) => {
            recorder.success(&SuccessEntry {
                edit_url: &url,
                path: report::log_path(src, page.path.as_deref()),
            });
            if let Some(src_record) = record.get_mut("src").and_then(Value::as_object_mut) {
                src_record.insert(EDIT_URL_KEY.to_string(), Value::String(url.clone()));
            }
            record.insert(EDIT_URL_KEY.to_string(), Value::String(url));
            return PageOutcome::Resolved;
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::report::MemoryRecorder;
    use crate::types::Origin;

    const DOCS_REMOTE: &str = "https://github.com/trento-project/docs.git";
    const DOCS_SCANNED: &str = "trento/adoc/checks_customization.adoc";
    const DOCS_PAGE_PATH: &str = "modules/user-guide/pages/checks_customization.adoc";
    const DOCS_URL: &str = "https://github.com/trento-project/docs/edit/main/trento/adoc/checks_customization.adoc";

    fn resolver() -> EditUrlResolver {
        return EditUrlResolver::new(EditConfig::default()).unwrap();
    }

    fn record(value: Value) -> PageRecord {
        let Value::Object(map) = value else {
            panic!("expected a JSON object");
        };
        return map;
    }

    fn docs_page(scanned: &str, refname: &str) -> PageRecord {
        return record(json!({
            "path": DOCS_PAGE_PATH,
            "src": {
                "scanned": scanned,
                "origin": { "refname": refname, "reftype": "branch", "url": DOCS_REMOTE },
            },
        }));
    }

    fn page_url(page: &PageRecord) -> Option<&str> {
        return page.get(EDIT_URL_KEY).and_then(Value::as_str);
    }

    fn src_url(page: &PageRecord) -> Option<&str> {
        return page
            .get("src")
            .and_then(|src| return src.get(EDIT_URL_KEY))
            .and_then(Value::as_str);
    }

    fn origin(refname: Option<&str>, reftype: &str, url: &str) -> Origin {
        return Origin {
            refname: refname.map(str::to_string),
            reftype: Some(reftype.to_string()),
            url: Some(url.to_string()),
            ..Origin::default()
        };
    }

    fn scanned_source(scanned: &str, refname: &str) -> PageSource {
        return PageSource {
            origin: Some(origin(Some(refname), "branch", DOCS_REMOTE)),
            scanned: Some(scanned.to_string()),
            ..PageSource::default()
        };
    }

    #[test]
    fn applies_edit_urls_across_catalog() {
        let mut pages = vec![
            docs_page(DOCS_SCANNED, "main"),
            docs_page(DOCS_SCANNED, "latest"),
            docs_page("trento-docs-site/build/tmp_components/web/README.adoc", "edit_button"),
        ];
        let mut recorder = MemoryRecorder::default();
        let summary = apply_edit_urls(&mut pages, &resolver(), &mut recorder);

        let urls: Vec<Option<&str>> = pages.iter().map(page_url).collect();
        assert_eq!(
            urls,
            vec![
                Some(DOCS_URL),
                Some(DOCS_URL),
                Some("https://github.com/trento-project/web/edit/main/README.adoc"),
            ]
        );
        assert_eq!(summary, ApplySummary { failed: 0, resolved: 3, skipped: 0 });
        assert_eq!(recorder.logs.len(), 3);
    }

    #[test]
    fn sets_url_on_page_and_source_and_logs() {
        let mut page = record(json!({
            "path": DOCS_PAGE_PATH,
            "src": {
                "path": DOCS_PAGE_PATH,
                "scanned": DOCS_SCANNED,
                "origin": { "refname": "main", "reftype": "branch", "url": DOCS_REMOTE },
            },
        }));
        let mut recorder = MemoryRecorder::default();

        assert_eq!(set_edit_url(&mut page, &resolver(), &mut recorder), PageOutcome::Resolved);
        assert_eq!(page_url(&page), Some(DOCS_URL));
        assert_eq!(src_url(&page), Some(DOCS_URL));
        assert_eq!(recorder.logs.len(), 1);
        assert_eq!(recorder.first_log(), json!({ "editUrl": DOCS_URL, "path": DOCS_PAGE_PATH }));
    }

    #[test]
    fn never_overwrites_existing_page_url() {
        let mut page = docs_page(DOCS_SCANNED, "latest");
        page.insert(EDIT_URL_KEY.to_string(), json!("https://example.com/existing-file-url"));
        let before = page.clone();
        let mut recorder = MemoryRecorder::default();

        assert_eq!(set_edit_url(&mut page, &resolver(), &mut recorder), PageOutcome::Skipped);
        assert_eq!(page, before);
        assert!(recorder.logs.is_empty());
        assert!(recorder.errors.is_empty());
    }

    #[test]
    fn never_overwrites_existing_source_url() {
        let mut page = record(json!({
            "src": {
                "editUrl": "https://example.com/existing-src-url",
                "scanned": DOCS_SCANNED,
                "origin": { "refname": "latest", "url": DOCS_REMOTE },
            },
        }));
        let before = page.clone();
        let mut recorder = MemoryRecorder::default();

        assert_eq!(set_edit_url(&mut page, &resolver(), &mut recorder), PageOutcome::Skipped);
        assert_eq!(page, before);
        assert!(recorder.logs.is_empty());
    }

    #[test]
    fn page_without_source_is_skipped_silently() {
        let mut page = record(json!({ "path": "a.adoc" }));
        let mut recorder = MemoryRecorder::default();
        assert_eq!(set_edit_url(&mut page, &resolver(), &mut recorder), PageOutcome::Skipped);
        assert!(recorder.errors.is_empty());
        assert!(!page.contains_key(EDIT_URL_KEY));
    }

    #[test]
    fn non_github_remote_fails_to_build() {
        let mut page = record(json!({
            "src": {
                "scanned": DOCS_SCANNED,
                "origin": { "refname": "latest", "reftype": "branch", "url": "https://gitlab.com/trento-project/docs.git" },
            },
        }));
        let mut recorder = MemoryRecorder::default();

        assert_eq!(set_edit_url(&mut page, &resolver(), &mut recorder), PageOutcome::Failed);
        assert_eq!(page_url(&page), None);
        assert_eq!(src_url(&page), None);
        assert!(recorder.logs.is_empty());
        assert_eq!(recorder.errors.len(), 1);
        let entry = recorder.first_error();
        assert_eq!(entry.get("stage"), Some(&json!("resolveEditUrl")));
        assert_eq!(entry.get("reason"), Some(&json!("build_edit_url_failed")));
        assert_eq!(entry.get("error"), Some(&json!("Failed to build edit URL")));
        assert_eq!(entry.get("sourcePath"), Some(&json!(DOCS_SCANNED)));
    }

    #[test]
    fn maps_latest_docs_content_to_main() {
        let src = scanned_source("trento/adoc/generic-attributes.adoc", "latest");
        assert_eq!(
            resolver().resolve(&src).as_deref(),
            Ok("https://github.com/trento-project/docs/edit/main/trento/adoc/generic-attributes.adoc")
        );
    }

    #[test]
    fn keeps_collector_source_branch() {
        let src = scanned_source(DOCS_SCANNED, "edit_button");
        assert_eq!(
            resolver().resolve(&src).as_deref(),
            Ok("https://github.com/trento-project/docs/edit/edit_button/trento/adoc/checks_customization.adoc")
        );
    }

    #[test]
    fn contribution_pages_edit_docs_repo_on_main() {
        let src = PageSource {
            origin: Some(origin(Some("v1.2.3"), "tag", DOCS_REMOTE)),
            scanned: Some("content/trento-docs-site/contribution-upstream/foo.adoc".to_string()),
            ..PageSource::default()
        };
        assert_eq!(
            resolver().resolve(&src).as_deref(),
            Ok("https://github.com/trento-project/docs/edit/main/content/trento-docs-site/contribution-upstream/foo.adoc")
        );
    }

    #[test]
    fn component_pages_edit_upstream_repo() {
        let src = scanned_source(
            "trento-docs-site/build/tmp_components/web/guides/Monitoring/monitoring.adoc",
            "latest",
        );
        assert_eq!(
            resolver().resolve(&src).as_deref(),
            Ok("https://github.com/trento-project/web/edit/main/guides/Monitoring/monitoring.adoc")
        );
    }

    #[test]
    fn component_pages_resolve_without_origin_metadata() {
        let src = PageSource {
            origin: Some(Origin::default()),
            scanned: Some("trento-docs-site/build/tmp_components/agent/docs/operators.adoc".to_string()),
            ..PageSource::default()
        };
        assert_eq!(
            resolver().resolve(&src).as_deref(),
            Ok("https://github.com/trento-project/agent/edit/main/docs/operators.adoc")
        );
    }

    #[test]
    fn repo_relative_path_from_absolute_source_wins() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join(".git")).unwrap();
        let abs = tmp.path().join("trento").join("adoc").join("from-abspath.adoc");
        let src = PageSource {
            origin: Some(origin(Some("main"), "branch", DOCS_REMOTE)),
            realpath: Some(abs.to_string_lossy().into_owned()),
            scanned: Some("modules/user-guide/pages/from-scanned.adoc".to_string()),
            ..PageSource::default()
        };
        assert_eq!(
            resolver().resolve(&src).as_deref(),
            Ok("https://github.com/trento-project/docs/edit/main/trento/adoc/from-abspath.adoc")
        );
    }

    #[test]
    fn collector_worktree_page_resolves_against_git_file_root() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(".git"), "gitdir: ../.git/worktrees/docs\n").unwrap();
        let worktree = tmp.path().join("docs-site");
        std::fs::create_dir_all(&worktree).unwrap();

        let mut page = record(json!({
            "src": {
                "scanned": "modules/user-guide/pages/intro.adoc",
                "origin": {
                    "collectorWorktree": worktree.to_string_lossy(),
                    "refname": "main",
                    "reftype": "branch",
                    "url": DOCS_REMOTE,
                },
            },
        }));
        let mut recorder = MemoryRecorder::default();

        assert_eq!(set_edit_url(&mut page, &resolver(), &mut recorder), PageOutcome::Resolved);
        assert_eq!(
            page_url(&page),
            Some("https://github.com/trento-project/docs/edit/main/docs-site/modules/user-guide/pages/intro.adoc")
        );
    }

    #[test]
    fn missing_head_is_an_incomplete_target() {
        let mut page = record(json!({
            "src": {
                "scanned": "modules/developer/pages/trento-docs-site/README.adoc",
                "origin": { "url": DOCS_REMOTE },
            },
        }));
        let mut recorder = MemoryRecorder::default();

        assert_eq!(set_edit_url(&mut page, &resolver(), &mut recorder), PageOutcome::Failed);
        let entry = recorder.first_error();
        assert_eq!(entry.get("reason"), Some(&json!("incomplete_target")));
        assert_eq!(entry.get("error"), Some(&json!("Incomplete edit URL target")));
        assert_eq!(
            entry.get("missing"),
            Some(&json!({ "head": true, "relPath": false, "remoteUrl": false }))
        );
    }

    #[test]
    fn missing_paths_is_an_incomplete_target() {
        let src = PageSource {
            origin: Some(origin(Some("main"), "branch", DOCS_REMOTE)),
            ..PageSource::default()
        };
        let Err(ResolveFailure::IncompleteTarget { missing, .. }) = resolver().resolve(&src) else {
            panic!("expected incomplete target");
        };
        assert!(missing.rel_path);
        assert!(!missing.head);
        assert!(!missing.remote_url);
    }

    #[test]
    fn rewrite_only_adds_edit_urls() {
        let raw = r#"[{"path":"p.adoc","src":{"scannedPath":"trento/adoc/a.adoc","realpath":null,"origin":{"refName":"main","remoteUrl":"https://github.com/trento-project/docs.git"}},"mediaType":"text/asciidoc"}]"#;
        let mut catalog = Catalog::parse(raw, Path::new("catalog.json")).unwrap();
        let mut recorder = MemoryRecorder::default();
        let summary = apply_edit_urls(&mut catalog.pages, &resolver(), &mut recorder);
        assert_eq!(summary.resolved, 1);

        let url = "https://github.com/trento-project/docs/edit/main/trento/adoc/a.adoc";
        let expected = format!(
            r#"[{{"path":"p.adoc","src":{{"scannedPath":"trento/adoc/a.adoc","realpath":null,"origin":{{"refName":"main","remoteUrl":"https://github.com/trento-project/docs.git"}},"editUrl":"{url}"}},"mediaType":"text/asciidoc","editUrl":"{url}"}}]"#
        );
        assert_eq!(serde_json::to_string(&catalog).unwrap(), expected);
    }

    #[test]
    fn failed_pages_are_written_back_unchanged() {
        let raw = r#"[{"src":{"scanned":"a.adoc","origin":{"refname":"main","url":"https://gitlab.com/o/r.git","startPath":null}},"editUrl":""}]"#;
        let mut catalog = Catalog::parse(raw, Path::new("catalog.json")).unwrap();
        let mut recorder = MemoryRecorder::default();
        apply_edit_urls(&mut catalog.pages, &resolver(), &mut recorder);
        assert_eq!(serde_json::to_string(&catalog).unwrap(), raw);
    }

    #[test]
    fn corrupt_catalog_is_reported_with_path() {
        let err = Catalog::parse("{\"not\": \"an array\"}", Path::new("pages.json")).unwrap_err();
        assert!(matches!(err, Error::CatalogCorrupt { .. }));
        assert!(err.to_string().contains("pages.json"));
    }
}
