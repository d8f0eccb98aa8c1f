//! Per-archive isolation boundary.

use std::fmt;
use std::path::{Path, PathBuf};

use libloading::Library;
use modhost_sdk::descriptor::{MODULE_ENTRY_SYMBOL, ModuleEntryFn, RawModuleDescriptor};

use crate::error::{Error, Result};

/// Loading context scoped to exactly one module archive.
///
/// Symbols resolved through one boundary are never shared with another,
/// even when two archives export identically named symbols; the platform
/// loader still lets module code resolve host-provided symbols through
/// parent delegation. The boundary is exclusively owned by the loader until
/// it is explicitly released during unload.
///
/// A *host* boundary carries no library handle and represents a unit
/// compiled into the host image itself.
pub struct ModuleBoundary {
    archive: PathBuf,
    library: Option<Library>,
}

impl ModuleBoundary {
    /// Open a boundary rooted at the given archive.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        // SAFETY: mapping the archive runs its initializers; archives placed
        // in the module directory are trusted by the host.
        let library = unsafe {
            Library::new(path).map_err(|source| Error::ArchiveOpen {
                path: path.to_path_buf(),
                source,
            })?
        };
        Ok(Self {
            archive: path.to_path_buf(),
            library: Some(library),
        })
    }

    /// Boundary for a unit living in the host image.
    pub fn host(origin: impl Into<PathBuf>) -> Self {
        Self {
            archive: origin.into(),
            library: None,
        }
    }

    /// Filesystem path of the archive this boundary is rooted at.
    pub fn archive_path(&self) -> &Path {
        &self.archive
    }

    /// Whether this boundary has no library handle of its own.
    pub fn is_host(&self) -> bool {
        self.library.is_none()
    }

    /// Resolve the module entry point, if the archive exports one.
    ///
    /// Returns `None` for host boundaries and for archives without the
    /// well-known symbol; such archives are not modules. The returned
    /// pointer stays valid for as long as this boundary is alive.
    pub(crate) fn entry(&self) -> Option<*const RawModuleDescriptor> {
        let library = self.library.as_ref()?;
        // SAFETY: the entry symbol's signature is fixed by the SDK ABI.
        let entry = unsafe { library.get::<ModuleEntryFn>(MODULE_ENTRY_SYMBOL).ok()? };
        // SAFETY: calling the module's exported, argument-free entry point.
        Some(unsafe { entry() })
    }

    /// Explicitly release the boundary, invalidating everything it loaded
    /// and closing the archive's file handle.
    pub fn release(mut self) -> Result<()> {
        if let Some(library) = self.library.take() {
            library.close().map_err(|source| Error::BoundaryRelease {
                path: self.archive.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

impl fmt::Debug for ModuleBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleBoundary")
            .field("archive", &self.archive)
            .field("host", &self.is_host())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_boundary_has_no_entry() {
        let boundary = ModuleBoundary::host("builtin");
        assert!(boundary.is_host());
        assert!(boundary.entry().is_none());
        assert_eq!(boundary.archive_path(), Path::new("builtin"));
        boundary.release().unwrap();
    }

    #[test]
    fn opening_a_missing_archive_fails() {
        let err = ModuleBoundary::open("/nonexistent/no-such-module.so").unwrap_err();
        assert!(matches!(err, Error::ArchiveOpen { .. }));
    }
}
