//! The module loader.
//!
//! Orchestrates directory scanning, archive introspection, unit
//! instantiation, lifecycle invocation, and teardown.

use std::collections::HashMap;
use std::ffi::c_void;
use std::fs;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};

use modhost_sdk::descriptor::{HOOK_OK, RawModuleDescriptor};
use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::boundary::ModuleBoundary;
use crate::descriptor::{ModuleDescriptor, ModuleVtable};
use crate::error::{Error, Result};
use crate::registry::{ModuleId, ModuleRecord, ModuleRegistry};

/// Extensibility hook invoked after a unit has been enabled, right before
/// it is registered. Lets a host wire freshly loaded units into other
/// subsystems (command registration and the like) without altering the
/// scan/load/register algorithm. The default implementation does nothing.
pub trait ModuleHandler<C> {
    fn handle(
        &mut self,
        id: ModuleId,
        descriptor: &ModuleDescriptor,
        host: &mut C,
    ) -> Result<()> {
        let _ = (id, descriptor, host);
        Ok(())
    }
}

/// Handler that does nothing.
pub struct NoopHandler;

impl<C> ModuleHandler<C> for NoopHandler {}

/// A live unit together with everything needed to tear it down.
struct LoadedUnit {
    id: ModuleId,
    descriptor: ModuleDescriptor,
    vtable: ModuleVtable,
    instance: *mut c_void,
    boundary: ModuleBoundary,
}

/// Loads module archives from a directory and manages their lifecycle.
///
/// `C` is the host context type: an opaque, caller-provided value passed by
/// mutable reference to every unit's enable and disable hooks. The loader
/// never inspects it. Modules must be compiled against the same context
/// type and ABI version as the host; the ABI version is checked at load
/// time, the context type is a contract the loader cannot verify.
///
/// Loading is synchronous and sequential on the caller's thread, in
/// directory-listing order (which is filesystem-dependent). The loader
/// exclusively owns its registry and every boundary it has opened.
pub struct ModuleLoader<C: 'static> {
    module_dir: PathBuf,
    extension: String,
    context: C,
    handler: Box<dyn ModuleHandler<C>>,
    registry: RwLock<ModuleRegistry>,
    units: Vec<LoadedUnit>,
}

impl<C: 'static> std::fmt::Debug for ModuleLoader<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("module_dir", &self.module_dir)
            .field("extension", &self.extension)
            .field("units", &self.units.len())
            .finish_non_exhaustive()
    }
}

impl<C: 'static> ModuleLoader<C> {
    /// Create a loader rooted at `module_dir`.
    ///
    /// The directory is created if it does not exist; failure to create it
    /// is fatal. The archive extension defaults to the platform's dynamic
    /// library suffix.
    pub fn new(module_dir: impl Into<PathBuf>, context: C) -> Result<Self> {
        let module_dir = module_dir.into();
        if !module_dir.is_dir() {
            fs::create_dir_all(&module_dir).map_err(|source| Error::DirectoryInit {
                path: module_dir.clone(),
                source,
            })?;
        }
        Ok(Self {
            module_dir,
            extension: std::env::consts::DLL_EXTENSION.to_string(),
            context,
            handler: Box::new(NoopHandler),
            registry: RwLock::new(ModuleRegistry::new()),
            units: Vec::new(),
        })
    }

    /// Override the archive extension filter (with or without leading dot).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Install an extensibility handler.
    pub fn with_handler(mut self, handler: impl ModuleHandler<C> + 'static) -> Self {
        self.handler = Box::new(handler);
        self
    }

    /// The configured module directory.
    pub fn module_dir(&self) -> &Path {
        &self.module_dir
    }

    /// The configured archive extension (without leading dot).
    pub fn module_extension(&self) -> &str {
        &self.extension
    }

    /// Shared access to the host context.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Mutable access to the host context.
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Snapshot of all loaded units' descriptors, keyed by identity.
    pub fn modules(&self) -> HashMap<ModuleId, ModuleDescriptor> {
        self.registry.read().snapshot()
    }

    /// Snapshot of all registry records, keyed by identity.
    pub fn module_records(&self) -> HashMap<ModuleId, ModuleRecord> {
        self.registry.read().records()
    }

    /// Originating archive path for a loaded unit.
    pub fn module_archive(&self, id: ModuleId) -> Option<PathBuf> {
        self.registry.read().archive(id)
    }

    /// Scan the module directory and load every matching archive.
    ///
    /// A directory that cannot be enumerated counts as "no modules found".
    /// Any failure while opening or reading a single archive is logged and
    /// that archive skipped; loading continues with the next file.
    pub fn load_modules(&mut self) {
        let entries = match fs::read_dir(&self.module_dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    "cannot enumerate module directory {:?}: {}",
                    self.module_dir, err
                );
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() || !self.matches_extension(&path) {
                continue;
            }
            if let Err(err) = self.load_archive(&path) {
                error!("failed to load module archive {:?}: {}", path, err);
            }
        }
    }

    /// Disable and destroy every loaded unit, release its boundary, and
    /// clear the registry.
    ///
    /// A disable-hook or boundary-release failure is logged and does not
    /// stop processing of the remaining units.
    pub fn unload_modules(&mut self) {
        for unit in self.units.drain(..) {
            let host = &mut self.context as *mut C as *mut c_void;

            // SAFETY: instance and vtable were produced together by this
            // unit's archive; the context type matches by the ABI contract.
            let status = unsafe { (unit.vtable.disable)(unit.instance, host) };
            if status != HOOK_OK {
                error!(
                    "disable hook failed for module '{}' (status {})",
                    unit.descriptor.name, status
                );
            }

            // SAFETY: the loader is the sole owner of the instance.
            unsafe { (unit.vtable.destroy)(unit.instance) };

            if let Err(err) = unit.boundary.release() {
                error!("failed to unload module '{}': {}", unit.descriptor.name, err);
            } else {
                debug!("module '{}' ({}) unloaded", unit.descriptor.name, unit.id);
            }
        }
        self.registry.write().clear();
    }

    /// Unload everything, then re-scan the module directory.
    pub fn reload_modules(&mut self) {
        self.unload_modules();
        self.load_modules();
    }

    /// Register a unit whose descriptor the caller obtained out of band,
    /// typically one compiled into the host image. The unit goes through
    /// the regular construct/enable/handle/register path with a host
    /// boundary.
    ///
    /// # Safety
    /// The descriptor's hooks must accept this loader's host context type,
    /// and its pointers must stay valid for the loader's lifetime.
    pub unsafe fn install(
        &mut self,
        raw: &RawModuleDescriptor,
        origin: impl Into<PathBuf>,
    ) -> Result<ModuleId> {
        self.load_unit(raw, ModuleBoundary::host(origin))
    }

    /// Suffix match on the whole file name, so multi-part extensions like
    /// `mod.so` work too.
    fn matches_extension(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        name.strip_suffix(self.extension.as_str())
            .is_some_and(|stem| stem.ends_with('.'))
    }

    fn load_archive(&mut self, path: &Path) -> Result<()> {
        let boundary = ModuleBoundary::open(path)?;

        let Some(raw) = boundary.entry() else {
            // Not a module; the archive merely matched the extension.
            debug!("no module entry point in {:?}, skipping", path);
            return Ok(());
        };
        if raw.is_null() {
            return Err(Error::EntryPoint {
                path: path.to_path_buf(),
            });
        }

        // SAFETY: the descriptor lives in the archive's static data and the
        // boundary keeping it mapped stays alive past this call.
        let raw = unsafe { &*raw };
        self.load_unit(raw, boundary).map(|_| ())
    }

    fn load_unit(&mut self, raw: &RawModuleDescriptor, boundary: ModuleBoundary) -> Result<ModuleId> {
        let archive = boundary.archive_path().to_path_buf();

        // SAFETY: descriptor string pointers reference the module's static
        // data, valid while its boundary is alive.
        let (descriptor, vtable) =
            unsafe { ModuleDescriptor::from_raw(raw) }.map_err(|source| Error::Descriptor {
                path: archive.clone(),
                source,
            })?;

        // SAFETY: zero-argument construction per the vtable contract.
        let instance = unsafe { (vtable.create)() };
        if instance.is_null() {
            return Err(Error::Construction { path: archive });
        }

        let host = &mut self.context as *mut C as *mut c_void;
        // SAFETY: instance was just produced by this vtable and the context
        // type matches by the ABI contract.
        let status = unsafe { (vtable.enable)(instance, host) };
        if status != HOOK_OK {
            // A unit that failed to enable is never exposed via the
            // registry; destroy it and give its boundary back.
            // SAFETY: sole owner of the instance.
            unsafe { (vtable.destroy)(instance) };
            if let Err(err) = boundary.release() {
                warn!("boundary release after failed enable: {}", err);
            }
            return Err(Error::Lifecycle {
                name: descriptor.name,
                hook: "enable",
                status,
            });
        }

        let id = self.registry.write().allocate();

        // The unit is already live; a handler failure or panic is logged,
        // not fatal, and the unit still registers for a symmetric teardown.
        let handled = catch_unwind(AssertUnwindSafe(|| {
            self.handler.handle(id, &descriptor, &mut self.context)
        }));
        match handled {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!("handler failed for module '{}': {}", descriptor.name, err);
            }
            Err(_) => {
                error!("handler panicked for module '{}'", descriptor.name);
            }
        }

        self.registry
            .write()
            .insert(id, descriptor.clone(), archive.clone());
        info!("loaded module '{}' from {:?}", descriptor, archive);

        self.units.push(LoadedUnit {
            id,
            descriptor,
            vtable,
            instance,
            boundary,
        });
        Ok(id)
    }
}

impl<C: 'static> Drop for ModuleLoader<C> {
    fn drop(&mut self) {
        // Units still enabled at teardown get their regular shutdown.
        self.unload_modules();
    }
}
