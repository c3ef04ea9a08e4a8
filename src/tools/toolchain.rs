use std::path::{Path, PathBuf};

/// Resolve a configured tool to an executable path.
///
/// A configured value containing a path separator must point at an
/// executable file. A bare name is looked up in `PATH`.
pub fn find_executable(configured: &Path) -> Option<PathBuf> {
    if configured.as_os_str().is_empty() {
        return None;
    }
    which::which(configured).ok()
}
