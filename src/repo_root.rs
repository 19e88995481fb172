use std::path::{Path, PathBuf};

/// Walk up from the file's directory and return the first ancestor that
/// contains `marker`. The marker may be a directory or a file (submodules and
/// worktrees use a `.git` file). A metadata lookup that fails counts as
/// "absent"; reaching the filesystem root without a hit returns `None`.
pub fn find_repo_root(file: &Path, marker: &str) -> Option<PathBuf> {
    let start = file.parent()?;
    return start
        .ancestors()
        .find(|dir| return dir.join(marker).exists())
        .map(Path::to_path_buf);
}
