//! C-ABI module descriptor.
//!
//! Every module library exports a single well-known entry symbol that
//! returns a pointer to a [`RawModuleDescriptor`]. The descriptor carries
//! the module's static metadata and its lifecycle vtable; the host loader
//! never looks at anything else inside the archive.

use core::ffi::c_void;

/// Current module ABI version.
/// A descriptor with any other version is rejected by the host loader.
pub const MODULE_ABI_VERSION: u32 = 1;

/// Name of the entry symbol every module library must export.
pub const MODULE_ENTRY_SYMBOL: &[u8] = b"modhost_module_entry";

/// Lifecycle hook completed successfully.
pub const HOOK_OK: i32 = 0;

/// Lifecycle hook reported an error.
pub const HOOK_FAILED: i32 = 1;

/// Lifecycle hook panicked; the panic was caught at the ABI boundary.
pub const HOOK_PANICKED: i32 = 2;

/// Zero-argument construction of the module unit.
/// Returns an opaque instance pointer, or null on failure.
pub type ModuleCreateFn = unsafe extern "C" fn() -> *mut c_void;

/// Enable hook: `(instance, host_context)` -> status code.
pub type ModuleEnableFn = unsafe extern "C" fn(*mut c_void, *mut c_void) -> i32;

/// Disable hook: `(instance, host_context)` -> status code.
pub type ModuleDisableFn = unsafe extern "C" fn(*mut c_void, *mut c_void) -> i32;

/// Destroys the instance and frees all of its resources.
pub type ModuleDestroyFn = unsafe extern "C" fn(*mut c_void);

/// Signature of the exported entry symbol.
pub type ModuleEntryFn = unsafe extern "C" fn() -> *const RawModuleDescriptor;

/// Module descriptor exported by module libraries.
///
/// String fields are pointer + length pairs into the module's static data
/// and must remain valid for as long as the library is mapped. `name` and
/// `author` are required and non-empty; the host rejects descriptors that
/// violate this.
#[repr(C)]
pub struct RawModuleDescriptor {
    /// ABI version - must match [`MODULE_ABI_VERSION`].
    pub abi_version: u32,

    /// Module name (required, non-empty UTF-8).
    pub name: *const u8,
    pub name_len: usize,

    /// Module author (required, non-empty UTF-8).
    pub author: *const u8,
    pub author_len: usize,

    /// Whether the module supports being reloaded.
    pub reloadable: bool,

    /// Lifecycle vtable.
    pub create: ModuleCreateFn,
    pub enable: ModuleEnableFn,
    pub disable: ModuleDisableFn,
    pub destroy: ModuleDestroyFn,
}

// SAFETY: the string pointers reference 'static data baked into the module
// image and the function pointers are plain code addresses; the descriptor
// itself is never mutated after construction.
unsafe impl Sync for RawModuleDescriptor {}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "C" fn create_stub() -> *mut c_void {
        core::ptr::null_mut()
    }

    unsafe extern "C" fn hook_stub(_instance: *mut c_void, _host: *mut c_void) -> i32 {
        HOOK_OK
    }

    unsafe extern "C" fn destroy_stub(_instance: *mut c_void) {}

    #[test]
    fn descriptor_is_constructible_in_a_static() {
        static DESCRIPTOR: RawModuleDescriptor = RawModuleDescriptor {
            abi_version: MODULE_ABI_VERSION,
            name: "stub".as_ptr(),
            name_len: "stub".len(),
            author: "tests".as_ptr(),
            author_len: "tests".len(),
            reloadable: true,
            create: create_stub,
            enable: hook_stub,
            disable: hook_stub,
            destroy: destroy_stub,
        };

        assert_eq!(DESCRIPTOR.abi_version, MODULE_ABI_VERSION);
        assert_eq!(DESCRIPTOR.name_len, 4);
        assert!(DESCRIPTOR.reloadable);
    }
}
