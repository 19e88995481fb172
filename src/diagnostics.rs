//! Markdown diagnostics for fatal errors.

use std::path::Path;

use crate::config::CONFIG_FILE;
use crate::error::Error;

/// ANSI bold.
const BOLD: &str = "\x1b[1m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic: what happened and,
/// where the user can act on it, a `## Fix` section.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::CatalogCorrupt { path, reason } => render_catalog_corrupt(path, reason),
        Error::CatalogNotFound { path } => render_catalog_not_found(path),
        Error::ComponentsDirUnreadable { path, reason } => render_components_unreadable(path, reason),
        Error::InvalidPattern { pattern, reason } => render_invalid_pattern(pattern, reason),
        Error::Io(err) => format!(
            "\
# Error: I/O

{err}
"
        ),
        Error::Json(err) => format!(
            "\
# Error: JSON Serialization

{err}
"
        ),
        Error::TomlDe(err) => format!(
            "\
# Error: Invalid Config

`{CONFIG_FILE}` could not be parsed: {err}

## Fix

Correct the file, or delete it to use the built-in defaults.
"
        ),
    };
}

/// The catalog is not a JSON array of pages.
fn render_catalog_corrupt(path: &Path, reason: &str) -> String {
    return format!(
        "\
# Error: Catalog Corrupt

`{}` is not a JSON array of pages: {reason}

## Fix

Export the content catalog again before running:

    editlink apply {}
",
        path.display(),
        path.display()
    );
}

/// The catalog path does not exist.
fn render_catalog_not_found(path: &Path) -> String {
    return format!(
        "\
# Error: Catalog Not Found

`{}` does not exist.

## Fix

Pass the path of the exported content catalog:

    editlink apply path/to/catalog.json
",
        path.display()
    );
}

/// The component tree is missing or unreadable.
fn render_components_unreadable(path: &Path, reason: &str) -> String {
    return format!(
        "\
# Error: Components Directory Unreadable

Could not list `{}`: {reason}

## Fix

Aggregate the upstream components first, or point at the right directory:

    editlink nav --components-dir path/to/tmp_components
",
        path.display()
    );
}

/// A configured path fragment produced an invalid regex.
fn render_invalid_pattern(pattern: &str, reason: &str) -> String {
    return format!(
        "\
# Error: Invalid Path Pattern

The configured paths produced the pattern `{pattern}`, which does not compile:

{reason}

## Fix

Check the `[edit_url]` section of `{CONFIG_FILE}`.
"
    );
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn catalog_not_found_has_fix() {
        let md = render_error(&Error::CatalogNotFound {
            path: PathBuf::from("build/catalog.json"),
        });
        assert!(md.starts_with("# Error: Catalog Not Found"));
        assert!(md.contains("`build/catalog.json` does not exist."));
        assert!(md.contains("## Fix"));
    }

    #[test]
    fn components_unreadable_names_directory_and_reason() {
        let md = render_error(&Error::ComponentsDirUnreadable {
            path: PathBuf::from("tmp_components"),
            reason: "No such file or directory".to_string(),
        });
        assert!(md.contains("Could not list `tmp_components`: No such file or directory"));
        assert!(md.contains("editlink nav --components-dir"));
    }

    #[test]
    fn invalid_config_points_at_config_file() {
        let Err(toml_err) = toml::from_str::<toml::Table>("[edit_url") else {
            panic!("expected parse failure");
        };
        let md = render_error(&Error::TomlDe(toml_err));
        assert!(md.starts_with("# Error: Invalid Config"));
        assert!(md.contains(".editlink.toml"));
    }
}
