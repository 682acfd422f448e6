//! Recursive module path scanning.

use crate::error::ModuleError;
use crate::loader::{DynamicLoader, NativeLoader};
use crate::path_list::{resolve_path, split_path_list};
use serde::Serialize;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Result of one candidate visited by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The loader accepted the file
    Loaded(PathBuf),
    /// The candidate is missing or the loader rejected it
    Failed(ModuleError),
    /// The walk could not inspect a path or read a directory; no load was tried
    Unreadable(ModuleError),
    /// A directory was not entered (cycle or depth limit)
    Skipped(PathBuf),
}

/// Everything that happened during one scan, in visiting order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub outcomes: Vec<LoadOutcome>,
}

impl ScanReport {
    /// Files handed to the loader, successful or not
    pub fn attempted(&self) -> usize {
        self.loaded() + self.failed()
    }

    /// Files the loader accepted
    pub fn loaded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, LoadOutcome::Loaded(_)))
            .count()
    }

    /// Files the loader rejected.
    ///
    /// Walk failures are not counted here, see [`ScanReport::unreadable`].
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, LoadOutcome::Failed(ModuleError::LoadFailed { .. })))
            .count()
    }

    /// Paths that did not exist
    pub fn missing(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, LoadOutcome::Failed(ModuleError::PathNotFound(_))))
            .count()
    }

    /// Paths or directories the walk could not read
    pub fn unreadable(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, LoadOutcome::Unreadable(_)))
            .count()
    }

    /// Directories not entered because of a cycle or the depth limit
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, LoadOutcome::Skipped(_)))
            .count()
    }

    /// True when the scan visited nothing at all
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// All recorded errors, in visiting order
    pub fn errors(&self) -> impl Iterator<Item = &ModuleError> {
        self.outcomes.iter().filter_map(|o| match o {
            LoadOutcome::Failed(e) | LoadOutcome::Unreadable(e) => Some(e),
            _ => None,
        })
    }

    /// Paths accepted by the loader, in visiting order
    pub fn loaded_paths(&self) -> impl Iterator<Item = &Path> {
        self.outcomes.iter().filter_map(|o| match o {
            LoadOutcome::Loaded(path) => Some(path.as_path()),
            _ => None,
        })
    }

    /// Counters and diagnostic lines, ready for serialization
    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            attempted: self.attempted(),
            loaded: self.loaded(),
            failed: self.failed(),
            missing: self.missing(),
            unreadable: self.unreadable(),
            skipped: self.skipped(),
            diagnostics: self.errors().map(ToString::to_string).collect(),
        }
    }
}

/// Serializable counters for a finished scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub attempted: usize,
    pub loaded: usize,
    pub failed: usize,
    pub missing: usize,
    pub unreadable: usize,
    pub skipped: usize,
    pub diagnostics: Vec<String>,
}

/// Walks module paths and hands every file it finds to a [`DynamicLoader`].
///
/// The scanner keeps no state between scans. Within a scan it only remembers
/// the canonical paths of the directories currently being walked, which stops
/// symlink cycles without hiding paths listed more than once.
#[derive(Debug, Clone, Default)]
pub struct ModuleScanner<L = NativeLoader> {
    loader: L,
    max_depth: Option<usize>,
}

impl ModuleScanner<NativeLoader> {
    /// Create a scanner that loads with the platform loader
    pub fn new() -> Self {
        Self::with_loader(NativeLoader)
    }
}

impl<L: DynamicLoader> ModuleScanner<L> {
    /// Create a scanner around any [`DynamicLoader`]
    pub fn with_loader(loader: L) -> Self {
        Self {
            loader,
            max_depth: None,
        }
    }

    /// Limit how many directory levels below a configured path are entered.
    ///
    /// A configured directory is depth 0. With `Some(0)` only the files
    /// directly inside it are loaded. `None` means no limit.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The loader candidates are handed to
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Scan the path list held by the environment variable `var_name`.
    ///
    /// An unset, empty or non-Unicode variable results in an empty report and
    /// no filesystem access.
    pub fn scan_env(&self, var_name: &str) -> ScanReport {
        match env::var(var_name) {
            Ok(value) => self.scan_path_list(&value),
            Err(env::VarError::NotPresent) => {
                debug!("{} is not set, no modules to load", var_name);
                ScanReport::default()
            }
            Err(env::VarError::NotUnicode(_)) => {
                warn!("{} is not valid Unicode, ignoring it", var_name);
                ScanReport::default()
            }
        }
    }

    /// Scan an already-read path-list value.
    pub fn scan_path_list(&self, value: &str) -> ScanReport {
        let mut report = ScanReport::default();
        let entries = split_path_list(value);
        if entries.is_empty() {
            return report;
        }

        info!("Scanning {} module path(s)", entries.len());
        for raw in &entries {
            let path = resolve_path(raw);
            self.scan_root(&path, &mut report);
        }

        info!(
            "Module scan finished: {} loaded, {} failed, {} missing",
            report.loaded(),
            report.failed(),
            report.missing()
        );
        report
    }

    /// Scan a single path, file or directory, as if it were one entry of the
    /// path list.
    pub fn scan_path(&self, path: impl AsRef<Path>) -> ScanReport {
        let mut report = ScanReport::default();
        self.scan_root(path.as_ref(), &mut report);
        report
    }

    fn scan_root(&self, path: &Path, report: &mut ScanReport) {
        let mut ancestors = Vec::new();
        self.visit(path, 0, &mut ancestors, report);
    }

    fn visit(
        &self,
        path: &Path,
        depth: usize,
        ancestors: &mut Vec<PathBuf>,
        report: &mut ScanReport,
    ) {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if is_missing(&e) => {
                self.record_error(ModuleError::PathNotFound(path.to_path_buf()), report);
                return;
            }
            Err(e) => {
                self.record_unreadable(ModuleError::load_failed(path, e.to_string()), report);
                return;
            }
        };

        if metadata.is_dir() {
            self.visit_dir(path, depth, ancestors, report);
            return;
        }

        match self.loader.load(path) {
            Ok(()) => {
                debug!("Loaded module {}", path.display());
                report.outcomes.push(LoadOutcome::Loaded(path.to_path_buf()));
            }
            Err(e) => self.record_error(e, report),
        }
    }

    fn visit_dir(
        &self,
        path: &Path,
        depth: usize,
        ancestors: &mut Vec<PathBuf>,
        report: &mut ScanReport,
    ) {
        if let Some(limit) = self.max_depth {
            if depth > limit {
                warn!(
                    "Skipping {}: deeper than max depth {}",
                    path.display(),
                    limit
                );
                report.outcomes.push(LoadOutcome::Skipped(path.to_path_buf()));
                return;
            }
        }

        let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if ancestors.contains(&canonical) {
            warn!(
                "Skipping {}: directory cycle back to {}",
                path.display(),
                canonical.display()
            );
            report.outcomes.push(LoadOutcome::Skipped(path.to_path_buf()));
            return;
        }

        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(e) => {
                let reason = format!("failed to read directory: {}", e);
                self.record_unreadable(ModuleError::load_failed(path, reason), report);
                return;
            }
        };

        debug!("Entering module directory {}", path.display());
        ancestors.push(canonical);
        let children = entries.map(|entry| entry.map(|entry| entry.path()));
        self.visit_entries(path, children, depth + 1, ancestors, report);
        ancestors.pop();
    }

    fn visit_entries(
        &self,
        dir: &Path,
        entries: impl Iterator<Item = io::Result<PathBuf>>,
        depth: usize,
        ancestors: &mut Vec<PathBuf>,
        report: &mut ScanReport,
    ) {
        for entry in entries {
            match entry {
                Ok(child) => self.visit(&child, depth, ancestors, report),
                Err(e) => {
                    let reason = format!("failed to read directory entry: {}", e);
                    self.record_unreadable(ModuleError::load_failed(dir, reason), report);
                }
            }
        }
    }

    fn record_error(&self, err: ModuleError, report: &mut ScanReport) {
        match &err {
            ModuleError::PathNotFound(_) => warn!("{}", err),
            ModuleError::LoadFailed { .. } => error!("{}", err),
        }
        report.outcomes.push(LoadOutcome::Failed(err));
    }

    fn record_unreadable(&self, err: ModuleError, report: &mut ScanReport) {
        error!("{}", err);
        report.outcomes.push(LoadOutcome::Unreadable(err));
    }
}

/// A path that runs through a regular file (`lib.so/sub`) does not exist
/// either.
fn is_missing(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
