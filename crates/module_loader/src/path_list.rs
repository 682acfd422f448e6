//! Path-list parsing for the module path variable.

use std::path::{Path, PathBuf};
use tracing::debug;

/// Separator between entries of a path-list variable
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: char = ';';
/// Separator between entries of a path-list variable
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: char = ':';

/// Splits a path-list value into its raw entries.
///
/// Order is preserved and nothing is deduplicated. Empty segments (a leading,
/// trailing or doubled separator) are kept as empty strings so that they show
/// up as "not found" during the scan. An empty value yields no entries.
pub fn split_path_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }

    value
        .split(PATH_LIST_SEPARATOR)
        .map(str::to_string)
        .collect()
}

/// Resolves a raw entry against the current working directory.
///
/// No canonicalization is done: symlinks and `..` components are left as
/// written. An empty entry stays empty.
pub fn resolve_path(raw: &str) -> PathBuf {
    let path = Path::new(raw);
    if raw.is_empty() || path.is_absolute() {
        return path.to_path_buf();
    }

    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(e) => {
            debug!("Cannot read current directory ({}), using {} as given", e, raw);
            path.to_path_buf()
        }
    }
}
