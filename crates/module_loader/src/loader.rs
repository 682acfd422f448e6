//! Platform dynamic-loading primitives.
//!
//! [`DynamicLoader`] is the single seam between the directory walk and the
//! operating system. [`NativeLoader`] picks its implementation at build time:
//!
//! * **Unix**: `dlopen` with lazy symbol binding
//! * **Windows**: `LoadLibraryExW`
//! * **Anything else**: every load fails with a "not supported" error, the
//!   walk and its diagnostics still happen

use crate::error::ModuleError;
use std::path::Path;
use tracing::{debug, info};

/// Loads one module file into the running process.
///
/// Implementations must not panic on bad input; every failure comes back as
/// [`ModuleError::LoadFailed`].
pub trait DynamicLoader {
    fn load(&self, path: &Path) -> Result<(), ModuleError>;
}

impl<L: DynamicLoader + ?Sized> DynamicLoader for &L {
    fn load(&self, path: &Path) -> Result<(), ModuleError> {
        (**self).load(path)
    }
}

/// Loader backed by the platform's native facility.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeLoader;

impl NativeLoader {
    /// Whether loading can succeed at all on this target
    pub const fn is_supported() -> bool {
        cfg!(any(unix, windows))
    }
}

#[cfg(unix)]
impl DynamicLoader for NativeLoader {
    fn load(&self, path: &Path) -> Result<(), ModuleError> {
        use libloading::os::unix::{Library, RTLD_LAZY};

        debug!("dlopen {}", path.display());

        // Running the module's initializers is the whole point of the call.
        let library = unsafe { Library::open(Some(path), RTLD_LAZY) }
            .map_err(|e| ModuleError::load_failed(path, e.to_string()))?;

        // Modules stay resident for the life of the process.
        std::mem::forget(library);
        Ok(())
    }
}

#[cfg(windows)]
impl DynamicLoader for NativeLoader {
    fn load(&self, path: &Path) -> Result<(), ModuleError> {
        use libloading::os::windows::Library;

        debug!("LoadLibrary {}", path.display());

        let library = unsafe { Library::new(path) }
            .map_err(|e| ModuleError::load_failed(path, e.to_string()))?;

        std::mem::forget(library);
        Ok(())
    }
}

#[cfg(not(any(unix, windows)))]
impl DynamicLoader for NativeLoader {
    fn load(&self, path: &Path) -> Result<(), ModuleError> {
        Err(ModuleError::load_failed(
            path,
            "module loading not supported on this platform",
        ))
    }
}

/// Accepts every candidate without touching it.
///
/// Used to preview which files a scan would try to load.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunLoader;

impl DynamicLoader for DryRunLoader {
    fn load(&self, path: &Path) -> Result<(), ModuleError> {
        info!("Would load module: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_native_loader_rejects_plain_text() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "definitely not a shared library").unwrap();

        let err = NativeLoader.load(file.path()).unwrap_err();
        match err {
            ModuleError::LoadFailed { path, reason } => {
                assert_eq!(path, file.path());
                assert!(!reason.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_native_loader_reports_missing_file_as_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.so");

        let err = NativeLoader.load(&missing).unwrap_err();
        assert!(matches!(err, ModuleError::LoadFailed { .. }));
    }

    #[test]
    fn test_dry_run_accepts_anything() {
        let file = NamedTempFile::new().unwrap();
        assert!(DryRunLoader.load(file.path()).is_ok());
    }

    #[test]
    fn test_loader_through_reference() {
        fn load_with<L: DynamicLoader>(loader: L, path: &Path) -> Result<(), ModuleError> {
            loader.load(path)
        }

        let file = NamedTempFile::new().unwrap();
        assert!(load_with(&DryRunLoader, file.path()).is_ok());
    }

    /// Finds a glibc library that a test binary does not link by default.
    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    fn unlinked_system_library() -> std::path::PathBuf {
        use std::env::consts::{ARCH, DLL_PREFIX, DLL_SUFFIX};

        let name = format!("{DLL_PREFIX}resolv{DLL_SUFFIX}.2");
        let multiarch = format!("{ARCH}-linux-gnu");
        let dirs = [
            format!("/lib/{multiarch}"),
            format!("/usr/lib/{multiarch}"),
            "/lib64".to_string(),
            "/usr/lib64".to_string(),
            "/lib".to_string(),
            "/usr/lib".to_string(),
        ];

        dirs.iter()
            .map(|dir| Path::new(dir).join(&name))
            .find(|path| path.exists())
            .unwrap_or_else(|| panic!("{name} not found in any of {dirs:?}"))
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    fn is_resident(path: &Path) -> bool {
        use libloading::os::unix::{Library, RTLD_LAZY};

        // RTLD_NOLOAD only succeeds for modules already mapped into the process.
        let library = unsafe { Library::open(Some(path), RTLD_LAZY | libc::RTLD_NOLOAD) };
        library.is_ok()
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn test_valid_module_loads_silently_and_stays_resident() {
        let module = unlinked_system_library();
        assert!(!is_resident(&module), "{} already loaded", module.display());
        assert!(NativeLoader::is_supported());

        let report = crate::ModuleScanner::new().scan_path(&module);
        assert_eq!(report.loaded(), 1);
        assert_eq!(report.attempted(), 1);
        assert!(report.errors().next().is_none());

        assert!(is_resident(&module));
    }
}
