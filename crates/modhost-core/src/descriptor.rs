//! Parsed module descriptors.
//!
//! Converts the raw C-ABI descriptor exported by a module archive into an
//! owned, validated value object plus the lifecycle vtable.

use std::fmt::{self, Display, Formatter};

use modhost_sdk::descriptor::{
    MODULE_ABI_VERSION, ModuleCreateFn, ModuleDestroyFn, ModuleDisableFn, ModuleEnableFn,
    RawModuleDescriptor,
};
use serde::{Deserialize, Serialize};

/// Immutable metadata attached to a loaded unit.
///
/// Descriptors are discovered from the archive, never synthesized by the
/// loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Module name.
    pub name: String,

    /// Module author.
    pub author: String,

    /// Whether the module supports being reloaded.
    pub reloadable: bool,
}

impl Display for ModuleDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.name, self.author)
    }
}

/// Lifecycle function pointers extracted from a raw descriptor.
#[derive(Debug, Clone, Copy)]
pub struct ModuleVtable {
    pub create: ModuleCreateFn,
    pub enable: ModuleEnableFn,
    pub disable: ModuleDisableFn,
    pub destroy: ModuleDestroyFn,
}

/// Descriptor parsing errors.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("ABI version mismatch: expected {expected}, found {found}")]
    AbiMismatch { expected: u32, found: u32 },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid UTF-8 in field '{0}'")]
    InvalidUtf8(&'static str, #[source] std::string::FromUtf8Error),
}

impl ModuleDescriptor {
    /// Parse a raw descriptor into an owned descriptor and its vtable.
    ///
    /// # Safety
    /// The raw descriptor's string pointers must be valid for their stated
    /// lengths for the duration of the call.
    pub unsafe fn from_raw(
        raw: &RawModuleDescriptor,
    ) -> Result<(Self, ModuleVtable), DescriptorError> {
        if raw.abi_version != MODULE_ABI_VERSION {
            return Err(DescriptorError::AbiMismatch {
                expected: MODULE_ABI_VERSION,
                found: raw.abi_version,
            });
        }

        let read_field = |ptr: *const u8,
                          len: usize,
                          field: &'static str|
         -> Result<String, DescriptorError> {
            if ptr.is_null() || len == 0 {
                return Err(DescriptorError::MissingField(field));
            }
            // SAFETY: caller guarantees ptr is valid for len bytes.
            let bytes = unsafe { std::slice::from_raw_parts(ptr, len) };
            String::from_utf8(bytes.to_vec())
                .map_err(|err| DescriptorError::InvalidUtf8(field, err))
        };

        let name = read_field(raw.name, raw.name_len, "name")?;
        let author = read_field(raw.author, raw.author_len, "author")?;

        Ok((
            Self {
                name,
                author,
                reloadable: raw.reloadable,
            },
            ModuleVtable {
                create: raw.create,
                enable: raw.enable,
                disable: raw.disable,
                destroy: raw.destroy,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::ffi::c_void;
    use modhost_sdk::descriptor::HOOK_OK;

    unsafe extern "C" fn create_stub() -> *mut c_void {
        core::ptr::null_mut()
    }

    unsafe extern "C" fn hook_stub(_instance: *mut c_void, _host: *mut c_void) -> i32 {
        HOOK_OK
    }

    unsafe extern "C" fn destroy_stub(_instance: *mut c_void) {}

    fn raw(name: &'static str, author: &'static str, abi_version: u32) -> RawModuleDescriptor {
        RawModuleDescriptor {
            abi_version,
            name: name.as_ptr(),
            name_len: name.len(),
            author: author.as_ptr(),
            author_len: author.len(),
            reloadable: true,
            create: create_stub,
            enable: hook_stub,
            disable: hook_stub,
            destroy: destroy_stub,
        }
    }

    #[test]
    fn parses_a_valid_descriptor() {
        let raw = raw("greeter", "Example", MODULE_ABI_VERSION);
        let (descriptor, _vtable) = unsafe { ModuleDescriptor::from_raw(&raw) }.unwrap();
        assert_eq!(descriptor.name, "greeter");
        assert_eq!(descriptor.author, "Example");
        assert!(descriptor.reloadable);
        assert_eq!(descriptor.to_string(), "greeter by Example");
    }

    #[test]
    fn rejects_abi_mismatch() {
        let raw = raw("greeter", "Example", MODULE_ABI_VERSION + 1);
        let err = unsafe { ModuleDescriptor::from_raw(&raw) }.unwrap_err();
        assert!(matches!(err, DescriptorError::AbiMismatch { .. }));
    }

    #[test]
    fn rejects_empty_required_fields() {
        let missing_name = raw("", "Example", MODULE_ABI_VERSION);
        let err = unsafe { ModuleDescriptor::from_raw(&missing_name) }.unwrap_err();
        assert!(matches!(err, DescriptorError::MissingField("name")));

        let missing_author = raw("greeter", "", MODULE_ABI_VERSION);
        let err = unsafe { ModuleDescriptor::from_raw(&missing_author) }.unwrap_err();
        assert!(matches!(err, DescriptorError::MissingField("author")));
    }

    #[test]
    fn descriptor_serializes_for_host_inventories() {
        let descriptor = ModuleDescriptor {
            name: "greeter".into(),
            author: "Example".into(),
            reloadable: false,
        };
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["name"], "greeter");
        assert_eq!(json["reloadable"], false);
    }
}
