//! Start-up loading of shared modules listed in a path-list variable.
//!
//! The host calls [`load_modules`] once, early in its start-up sequence. Every
//! entry of the variable is resolved against the current directory, walked
//! recursively, and every file found is handed to the platform's dynamic
//! loader. Loading a module runs its initializers; nothing else is done with
//! it afterwards.
//!
//! Failures never propagate. A missing path or a file that is not a loadable
//! module is logged through `tracing` and recorded in the returned
//! [`ScanReport`], and the scan moves on to the next candidate.
//!
//! ```no_run
//! use module_loader::{load_modules, DEFAULT_MODULE_PATH_VAR};
//!
//! let report = load_modules(DEFAULT_MODULE_PATH_VAR);
//! println!("{} module(s) loaded", report.loaded());
//! ```

pub mod error;
pub mod loader;
pub mod path_list;
pub mod scanner;

pub use error::ModuleError;
pub use loader::{DryRunLoader, DynamicLoader, NativeLoader};
pub use path_list::{resolve_path, split_path_list, PATH_LIST_SEPARATOR};
pub use scanner::{LoadOutcome, ModuleScanner, ScanReport, ScanSummary};

/// Conventional name of the module path variable
pub const DEFAULT_MODULE_PATH_VAR: &str = "MODULE_PATH";

/// Load every module reachable from the paths in the variable `var_name`.
pub fn load_modules(var_name: &str) -> ScanReport {
    ModuleScanner::new().scan_env(var_name)
}

/// Load every module reachable from an already-read path-list value.
pub fn load_module_path_list(value: &str) -> ScanReport {
    ModuleScanner::new().scan_path_list(value)
}
