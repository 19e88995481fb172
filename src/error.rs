/// Crate-level error types for editlink diagnostics.
use std::path::PathBuf;

/// Fatal errors at the command boundary. Per-page resolution failures are
/// not errors; they are carried by [`crate::edit_url::ResolveFailure`].
/// Each variant names the file or reason so the diagnostic stands alone.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The catalog file exists but is not a JSON array of pages.
    #[error("catalog corrupt: {}: {reason}", path.display())]
    CatalogCorrupt {
        /// Path to the catalog file.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// Expected catalog does not exist on disk.
    #[error("catalog not found: {}", path.display())]
    CatalogNotFound {
        /// Path to the missing catalog.
        path: PathBuf,
    },

    /// The synthesized component tree could not be listed.
    #[error("could not read components directory {}: {reason}", path.display())]
    ComponentsDirUnreadable {
        /// Directory that was expected to hold one subdirectory per component.
        path: PathBuf,
        /// Underlying I/O failure.
        reason: String,
    },

    /// A configured path fragment produced an invalid matcher.
    #[error("invalid path pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The generated regular expression.
        pattern: String,
        /// Regex compiler message.
        reason: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// TOML deserialization of `.editlink.toml` failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
