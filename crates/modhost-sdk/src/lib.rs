//! modhost module SDK.
//!
//! This crate is the module-author half of the modhost module system. A
//! module is an ordinary cdylib crate that implements [`Loadable`] for its
//! unit type and calls [`export_module!`] once at the crate root:
//!
//! ```ignore
//! use modhost_sdk::prelude::*;
//!
//! #[derive(Default)]
//! struct Greeter;
//!
//! impl Loadable<HostState> for Greeter {
//!     fn on_enable(&mut self, host: &mut HostState) -> HookResult {
//!         host.greetings += 1;
//!         Ok(())
//!     }
//!
//!     fn on_disable(&mut self, host: &mut HostState) -> HookResult {
//!         host.greetings -= 1;
//!         Ok(())
//!     }
//! }
//!
//! export_module!(Greeter, HostState, name: "greeter", author: "Example");
//! ```
//!
//! The macro exports a single C-ABI entry symbol the host loader resolves;
//! everything that crosses the library boundary is `#[repr(C)]` data and
//! plain function pointers, so host and module can be built separately as
//! long as they agree on [`descriptor::MODULE_ABI_VERSION`] and the host
//! context type.

pub mod descriptor;
pub mod error;
#[macro_use]
pub mod macros;
pub mod types;

pub use descriptor::{
    HOOK_FAILED, HOOK_OK, HOOK_PANICKED, MODULE_ABI_VERSION, MODULE_ENTRY_SYMBOL,
    ModuleCreateFn, ModuleDestroyFn, ModuleDisableFn, ModuleEnableFn, ModuleEntryFn,
    RawModuleDescriptor,
};
pub use error::{HookError, HookResult};
pub use types::Loadable;

/// Common imports for module crates.
pub mod prelude {
    pub use crate::descriptor::{MODULE_ABI_VERSION, RawModuleDescriptor};
    pub use crate::error::{HookError, HookResult};
    pub use crate::export_module;
    pub use crate::types::Loadable;
}
