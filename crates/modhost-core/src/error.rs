//! Error taxonomy for the module subsystem.

use std::io;
use std::path::PathBuf;

use crate::descriptor::DescriptorError;

/// Result type for module operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Module subsystem errors.
///
/// Only [`Error::DirectoryInit`] is allowed to escape to the host as a hard
/// failure; every other variant is isolated to its archive or unit by the
/// loader, logged, and skipped.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Module directory absent and could not be created. Fatal.
    #[error("failed to create module directory {path:?}: {source}")]
    DirectoryInit {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Archive could not be opened as a dynamic library.
    #[error("failed to open module archive {path:?}: {source}")]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// The entry point resolved but produced no descriptor.
    #[error("module entry point in {path:?} returned no descriptor")]
    EntryPoint { path: PathBuf },

    /// The exported descriptor is malformed.
    #[error("invalid module descriptor in {path:?}: {source}")]
    Descriptor {
        path: PathBuf,
        #[source]
        source: DescriptorError,
    },

    /// Zero-argument construction returned null.
    #[error("module construction failed in {path:?}")]
    Construction { path: PathBuf },

    /// An enable or disable hook reported failure or panicked.
    #[error("{hook} hook failed for module '{name}' (status {status})")]
    Lifecycle {
        name: String,
        hook: &'static str,
        status: i32,
    },

    /// Releasing an isolation boundary failed.
    #[error("failed to release isolation boundary for {path:?}: {source}")]
    BoundaryRelease {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// An extensibility handler rejected a freshly enabled unit.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}
