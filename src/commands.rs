//! CLI commands: apply, url, nav.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::catalog::{self, Catalog, EditUrlResolver};
use crate::config::Config;
use crate::edit_url::{EditUrlBuilder, ResolveFailure};
use crate::error::Error;
use crate::nav;
use crate::report::{ConsoleRecorder, FailureEntry, Recorder as _};
use crate::types::{RefHead, RefKind};

/// Resolve edit URLs for every page of a catalog and write it back.
/// Per-page failures are logged and never change the exit status.
///
/// # Errors
///
/// Returns errors from config loading, catalog reading, or catalog writing.
pub fn apply(catalog_path: &Path, output: Option<&Path>) -> Result<(), Error> {
    let config = Config::load(Path::new("."))?;
    let mut catalog = Catalog::read(catalog_path)?;
    let resolver = EditUrlResolver::new(config.edit_url)?;

    let mut recorder = ConsoleRecorder;
    let summary = catalog::apply_edit_urls(&mut catalog.pages, &resolver, &mut recorder);

    let target = output.unwrap_or(catalog_path);
    catalog.write(target)?;
    eprintln!(
        "{} resolved, {} skipped, {} failed; wrote {}",
        summary.resolved,
        summary.skipped,
        summary.failed,
        target.display()
    );
    return Ok(());
}

/// Generate the component navigation file. Flags override the configured directories.
///
/// # Errors
///
/// Returns errors from config loading, listing the components, or writing the file.
pub fn nav(components_dir: Option<PathBuf>, output_dir: Option<PathBuf>) -> Result<(), Error> {
    let mut config = Config::load(Path::new("."))?.navigation;
    if let Some(dir) = components_dir {
        config.components_dir = dir;
    }
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    let output = nav::generate(&config)?;
    nav::print_summary(&output);
    return Ok(());
}

/// Print the edit URL for one remote, ref and path.
/// Exits with 1 and a failure log line when the remote is not recognized.
///
/// # Errors
///
/// Returns errors from config loading or matcher compilation.
pub fn url(remote: &str, git_ref: &str, path: Option<&str>) -> Result<ExitCode, Error> {
    let config = Config::load(Path::new("."))?;
    let builder = EditUrlBuilder::new(&config.edit_url)?;
    let head = RefHead {
        ref_name: git_ref.to_string(),
        ref_type: RefKind::Branch,
    };

    if let Some(url) = builder.build(remote, &head, path) {
        println!("{url}");
        return Ok(ExitCode::SUCCESS);
    }

    let failure = ResolveFailure::BuildEditUrlFailed {
        head,
        rel_path: path.unwrap_or_default().to_string(),
        remote_url: remote.to_string(),
    };
    let source_path = path.filter(|p| return !p.is_empty()).unwrap_or("unknown");
    ConsoleRecorder.failure(&FailureEntry::new(&failure, source_path.to_string()));
    return Ok(ExitCode::FAILURE);
}
