//! Executable discovery.

use std::path::{Path, PathBuf};

/// Locates executables by name.
///
/// Abstracts the search-path lookup so tests can substitute a fixed or
/// counting resolver without touching the process environment.
pub trait ExecutableResolver {
    /// Returns the path of an executable called `name`, if one is available.
    fn find(&self, name: &str) -> Option<PathBuf>;
}

impl<R: ExecutableResolver + ?Sized> ExecutableResolver for &R {
    fn find(&self, name: &str) -> Option<PathBuf> {
        (**self).find(name)
    }
}

impl<R: ExecutableResolver + ?Sized> ExecutableResolver for Box<R> {
    fn find(&self, name: &str) -> Option<PathBuf> {
        (**self).find(name)
    }
}

/// Searches an ordered list of directories, like a shell searching `PATH`.
#[derive(Debug, Clone, Default)]
pub struct SearchPathResolver {
    dirs: Vec<PathBuf>,
}

impl SearchPathResolver {
    /// Searches the given directories in order.
    pub fn new(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            dirs: dirs.into_iter().collect(),
        }
    }

    /// Searches the directories listed in the `PATH` environment variable.
    pub fn from_env() -> Self {
        let dirs = std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).collect())
            .unwrap_or_default();
        Self { dirs }
    }

    /// The directories searched, in order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl ExecutableResolver for SearchPathResolver {
    fn find(&self, name: &str) -> Option<PathBuf> {
        self.dirs.iter().find_map(|dir| {
            candidate_names(name)
                .into_iter()
                .map(|candidate| dir.join(candidate))
                .find(|path| is_executable(path))
        })
    }
}

#[cfg(windows)]
fn candidate_names(name: &str) -> Vec<String> {
    vec![name.to_string(), format!("{name}.exe")]
}

#[cfg(not(windows))]
fn candidate_names(name: &str) -> Vec<String> {
    vec![name.to_string()]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
