//! Host-side dynamic module subsystem.
//!
//! The loader scans a directory for module archives (dynamic libraries),
//! resolves the well-known entry symbol in each, instantiates the exported
//! unit inside a per-archive isolation boundary, runs its enable hook
//! against the host-supplied context, and records the unit in a
//! loader-owned registry. Unloading reverses the process: disable every
//! unit, destroy it, release its boundary, clear the registry.
//!
//! A single malformed archive never prevents the others from loading; every
//! per-archive and per-unit failure is logged and skipped. Only a module
//! directory that cannot be created aborts loader construction.

pub mod boundary;
pub mod descriptor;
pub mod error;
pub mod loader;
pub mod registry;

pub use boundary::ModuleBoundary;
pub use descriptor::{DescriptorError, ModuleDescriptor, ModuleVtable};
pub use error::{Error, Result};
pub use loader::{ModuleHandler, ModuleLoader, NoopHandler};
pub use registry::{ModuleId, ModuleRecord, ModuleRegistry};

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::loader::{ModuleHandler, ModuleLoader};
    pub use crate::registry::{ModuleId, ModuleRecord};
    pub use crate::descriptor::ModuleDescriptor;
}
