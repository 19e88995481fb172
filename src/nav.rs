//! Navigation file for the synthesized component tree.
//!
//! Every component with a README gets an entry, followed by the AsciiDoc
//! pages found in its documentation directories. Subdirectories of a
//! documentation directory are listed one level deeper and not recursed
//! any further.

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::{DirEntry, WalkDir};

use crate::config::NavConfig;
use crate::error::Error;

/// Horizontal rule framing the printed navigation content.
const RULE: &str = "============================================================";

/// Builds navigation entries for one layout.
pub struct NavBuilder<'a> {
    /// Layout and nesting settings.
    config: &'a NavConfig,
    /// Matches the first `= Title` line of a page.
    title: Regex,
}

/// Result of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavOutput {
    /// Every component directory found, including those without a README.
    pub components: Vec<String>,
    /// The generated navigation file content.
    pub content: String,
    /// Where the content was written.
    pub path: PathBuf,
}

impl<'a> NavBuilder<'a> {
    /// Title of a page: its first `= Title` line, else the file name
    /// without extension. Unreadable files fall back with a warning.
    pub fn extract_title(&self, file: &Path) -> String {
        let name = file.file_name().map(|n| return n.to_string_lossy().into_owned()).unwrap_or_default();
        let suffix = format!(".{}", self.config.extension);
        let fallback = name.strip_suffix(suffix.as_str()).unwrap_or(&name).to_string();

        let content = match std::fs::read_to_string(file) {
            Err(e) => {
                eprintln!("warning: could not read {}: {e}", file.display());
                return fallback;
            },
            Ok(c) => c,
        };
        return self
            .title
            .captures(&content)
            .and_then(|caps| return caps.get(1))
            .map(|m| return m.as_str().trim())
            .filter(|t| return !t.is_empty())
            .map_or(fallback, str::to_string);
    }

    /// Is `name` a documentation page?
    fn is_page(&self, name: &str) -> bool {
        return name.ends_with(&format!(".{}", self.config.extension));
    }

    /// Prepare a builder for `config`.
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded title regex is invalid (compile-time invariant).
    #[allow(clippy::expect_used, reason = "constant pattern")]
    pub fn new(config: &'a NavConfig) -> Self {
        return Self {
            config,
            title: Regex::new(r"(?m)^=\s*(.+)").expect("valid regex"),
        };
    }

    /// Render the whole navigation file for the given components.
    pub fn render(&self, components: &[String]) -> String {
        let mut content = format!(
            "{} {}\n\n",
            bullets(self.config.section_level),
            self.config.section_title
        );
        for component in components {
            if let Some(block) = self.render_component(component) {
                content.push_str(&block);
            }
        }
        let mut content = content.trim_end().to_string();
        content.push('\n');
        return content;
    }

    /// README entry plus every documentation directory, followed by a blank
    /// line. `None` when the component has no README.
    fn render_component(&self, component: &str) -> Option<String> {
        let root = self.config.components_dir.join(component);
        let readme = root.join(&self.config.readme);
        if !readme.is_file() {
            return None;
        }
        let mut block = format!(
            "{} {}\n",
            bullets(self.config.readme_level),
            self.xref(component, &self.config.readme, &self.extract_title(&readme))
        );
        for docs_dir in &self.config.docs_dirs {
            block.push_str(&self.render_docs_dir(component, &root.join(docs_dir)));
        }
        block.push('\n');
        return Some(block);
    }

    /// Pages and subdirectories directly under one documentation directory.
    fn render_docs_dir(&self, component: &str, dir: &Path) -> String {
        let level = self.config.docs_level;
        let mut out = String::new();
        for entry in sorted_entries(dir, &self.config.ignored_dirs) {
            let name = entry.file_name().to_string_lossy();
            if entry.file_type().is_dir() {
                out.push_str(&self.render_subdir(component, &name, entry.path()));
            } else if name != self.config.readme && self.is_page(&name) {
                let title = self.extract_title(entry.path());
                out.push_str(&format!("{} {}\n", bullets(level), self.xref(component, &name, &title)));
            }
        }
        return out;
    }

    /// A subdirectory entry (linked when it has a README) and its direct pages.
    fn render_subdir(&self, component: &str, name: &str, dir: &Path) -> String {
        let level = self.config.docs_level;
        let mut out = if dir.join(&self.config.readme).exists() {
            let target = format!("{name}/{}", self.config.readme);
            format!("{} {}\n", bullets(level), self.xref(component, &target, name))
        } else {
            format!("{} {name}\n", bullets(level))
        };

        let nested = bullets(level.saturating_add(1));
        for entry in sorted_entries(dir, &self.config.ignored_dirs) {
            let file = entry.file_name().to_string_lossy();
            if entry.file_type().is_dir() || file == self.config.readme || !self.is_page(&file) {
                continue;
            }
            let title = self.extract_title(entry.path());
            let target = format!("{name}/{file}");
            out.push_str(&format!("{nested} {}\n", self.xref(component, &target, &title)));
        }
        return out;
    }

    /// `xref:<module>:<component>:<path>[<title>]`.
    fn xref(&self, component: &str, path: &str, title: &str) -> String {
        return format!("xref:{}:{component}:{path}[{title}]", self.config.xref_module);
    }
}

/// Generate the navigation file: create the output directory, list the
/// components, render their entries and write the result.
///
/// # Errors
///
/// Returns `Error::ComponentsDirUnreadable` if the component tree cannot be
/// listed, or `Error::Io` if the output cannot be written.
pub fn generate(config: &NavConfig) -> Result<NavOutput, Error> {
    std::fs::create_dir_all(&config.output_dir)?;
    let components = list_components(&config.components_dir)?;
    let content = NavBuilder::new(config).render(&components);
    let path = config.output_path();
    std::fs::write(&path, &content)?;
    return Ok(NavOutput {
        components,
        content,
        path,
    });
}

/// Names of the immediate subdirectories of `dir`, sorted.
///
/// # Errors
///
/// Returns `Error::ComponentsDirUnreadable` if `dir` cannot be listed.
pub fn list_components(dir: &Path) -> Result<Vec<String>, Error> {
    let unreadable = |e: &dyn std::fmt::Display| {
        return Error::ComponentsDirUnreadable {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        };
    };
    let mut components = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| return unreadable(&e))? {
        let entry = entry.map_err(|e| return unreadable(&e))?;
        if entry.file_type().is_ok_and(|t| return t.is_dir()) {
            components.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    components.sort();
    return Ok(components);
}

/// Print the processed components, the generated content and its location.
pub fn print_summary(output: &NavOutput) {
    println!(
        "Processed {} upstream components: {}",
        output.components.len(),
        output.components.join(", ")
    );
    println!("{RULE}");
    println!("Generated navigation content");
    println!("{RULE}");
    println!("{}", output.content);
    println!("{RULE}");
    println!("Navigation file generated: {}", output.path.display());
}

/// Bullet prefix for a nesting level.
fn bullets(level: usize) -> String {
    return "*".repeat(level);
}

/// Order entry names the way a locale-aware comparison would: letters
/// compare case-insensitively, and on a tie the lowercase name goes first.
fn compare_names(a: &OsStr, b: &OsStr) -> Ordering {
    return a
        .to_ascii_lowercase()
        .cmp(&b.to_ascii_lowercase())
        .then_with(|| return b.cmp(a));
}

/// Entries of `dir` sorted by name, without ignored directories.
/// An unreadable or missing directory has no entries.
fn sorted_entries(dir: &Path, ignored: &[String]) -> Vec<DirEntry> {
    return WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by(|a, b| return compare_names(a.file_name(), b.file_name()))
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| {
            if !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy().to_lowercase();
            return !ignored.contains(&name);
        })
        .collect();
}
