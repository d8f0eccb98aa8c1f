//! The `export_module!` macro.

/// Exports a type as the module of the enclosing cdylib crate.
///
/// Generates the static [`RawModuleDescriptor`](crate::RawModuleDescriptor),
/// panic-safe `extern "C"` lifecycle shims, and the well-known entry symbol
/// the host loader resolves. Invoke it exactly once, at the crate root.
///
/// The unit type must implement `Default` (zero-argument construction) and
/// [`Loadable<Host>`](crate::Loadable) for the host context type named in
/// the invocation. `reloadable` defaults to `true`.
///
/// # Example
///
/// ```ignore
/// export_module!(MyUnit, HostState, name: "my.unit", author: "Me");
/// export_module!(MyUnit, HostState, name: "my.unit", author: "Me", reloadable: false);
/// ```
#[macro_export]
macro_rules! export_module {
    (
        $ty:ty,
        $host:ty,
        name: $name:literal,
        author: $author:literal
    ) => {
        $crate::export_module!($ty, $host, name: $name, author: $author, reloadable: true);
    };
    (
        $ty:ty,
        $host:ty,
        name: $name:literal,
        author: $author:literal,
        reloadable: $reloadable:expr
    ) => {
        #[doc(hidden)]
        unsafe extern "C" fn __modhost_create() -> *mut ::core::ffi::c_void {
            match ::std::panic::catch_unwind(|| <$ty as ::core::default::Default>::default()) {
                Ok(unit) => {
                    ::std::boxed::Box::into_raw(::std::boxed::Box::new(unit))
                        as *mut ::core::ffi::c_void
                }
                Err(_) => ::core::ptr::null_mut(),
            }
        }

        #[doc(hidden)]
        unsafe extern "C" fn __modhost_enable(
            instance: *mut ::core::ffi::c_void,
            host: *mut ::core::ffi::c_void,
        ) -> i32 {
            if instance.is_null() || host.is_null() {
                return $crate::HOOK_FAILED;
            }
            let outcome = ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| {
                // SAFETY: the host passes back the pointer produced by
                // `__modhost_create` and a context of the agreed type.
                let unit = unsafe { &mut *(instance as *mut $ty) };
                let host = unsafe { &mut *(host as *mut $host) };
                $crate::Loadable::<$host>::on_enable(unit, host)
            }));
            match outcome {
                Ok(Ok(())) => $crate::HOOK_OK,
                Ok(Err(_)) => $crate::HOOK_FAILED,
                Err(_) => $crate::HOOK_PANICKED,
            }
        }

        #[doc(hidden)]
        unsafe extern "C" fn __modhost_disable(
            instance: *mut ::core::ffi::c_void,
            host: *mut ::core::ffi::c_void,
        ) -> i32 {
            if instance.is_null() || host.is_null() {
                return $crate::HOOK_FAILED;
            }
            let outcome = ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| {
                // SAFETY: same contract as `__modhost_enable`.
                let unit = unsafe { &mut *(instance as *mut $ty) };
                let host = unsafe { &mut *(host as *mut $host) };
                $crate::Loadable::<$host>::on_disable(unit, host)
            }));
            match outcome {
                Ok(Ok(())) => $crate::HOOK_OK,
                Ok(Err(_)) => $crate::HOOK_FAILED,
                Err(_) => $crate::HOOK_PANICKED,
            }
        }

        #[doc(hidden)]
        unsafe extern "C" fn __modhost_destroy(instance: *mut ::core::ffi::c_void) {
            if instance.is_null() {
                return;
            }
            // SAFETY: the instance was produced by `__modhost_create` and
            // ownership is handed back exactly once.
            let _ = ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| unsafe {
                drop(::std::boxed::Box::from_raw(instance as *mut $ty));
            }));
        }

        #[doc(hidden)]
        static __MODHOST_DESCRIPTOR: $crate::RawModuleDescriptor = $crate::RawModuleDescriptor {
            abi_version: $crate::MODULE_ABI_VERSION,
            name: $name.as_ptr(),
            name_len: $name.len(),
            author: $author.as_ptr(),
            author_len: $author.len(),
            reloadable: $reloadable,
            create: __modhost_create,
            enable: __modhost_enable,
            disable: __modhost_disable,
            destroy: __modhost_destroy,
        };

        /// Entry symbol resolved by the host loader.
        #[no_mangle]
        pub extern "C" fn modhost_module_entry() -> *const $crate::RawModuleDescriptor {
            &__MODHOST_DESCRIPTOR
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::error::HookResult;
    use crate::types::Loadable;
    use crate::{HOOK_FAILED, HOOK_OK, HOOK_PANICKED, MODULE_ABI_VERSION};

    struct Counter {
        value: i64,
    }

    #[derive(Default)]
    struct Bump;

    impl Loadable<Counter> for Bump {
        fn on_enable(&mut self, host: &mut Counter) -> HookResult {
            host.value += 1;
            if host.value > 2 {
                panic!("counter overflow");
            }
            Ok(())
        }

        fn on_disable(&mut self, host: &mut Counter) -> HookResult {
            host.value -= 1;
            if host.value < 0 {
                return Err(crate::HookError::msg("counter underflow"));
            }
            Ok(())
        }
    }

    export_module!(Bump, Counter, name: "bump", author: "sdk tests", reloadable: false);

    #[test]
    fn exported_descriptor_round_trips_through_the_entry_symbol() {
        let raw = modhost_module_entry();
        assert!(!raw.is_null());

        let raw = unsafe { &*raw };
        assert_eq!(raw.abi_version, MODULE_ABI_VERSION);
        assert!(!raw.reloadable);

        let name = unsafe { std::slice::from_raw_parts(raw.name, raw.name_len) };
        assert_eq!(name, b"bump");
        let author = unsafe { std::slice::from_raw_parts(raw.author, raw.author_len) };
        assert_eq!(author, b"sdk tests");
    }

    #[test]
    fn shims_drive_the_loadable_impl() {
        let raw = unsafe { &*modhost_module_entry() };
        let mut host = Counter { value: 0 };
        let host_ptr = &mut host as *mut Counter as *mut core::ffi::c_void;

        let instance = unsafe { (raw.create)() };
        assert!(!instance.is_null());

        assert_eq!(unsafe { (raw.enable)(instance, host_ptr) }, HOOK_OK);
        assert_eq!(host.value, 1);

        assert_eq!(unsafe { (raw.disable)(instance, host_ptr) }, HOOK_OK);
        assert_eq!(host.value, 0);

        // Underflow surfaces as a failed hook, not a panic.
        assert_eq!(unsafe { (raw.disable)(instance, host_ptr) }, HOOK_FAILED);

        // A panicking hook is caught at the boundary.
        host.value = 2;
        assert_eq!(unsafe { (raw.enable)(instance, host_ptr) }, HOOK_PANICKED);

        unsafe { (raw.destroy)(instance) };
    }

    #[test]
    fn shims_reject_null_pointers() {
        let raw = unsafe { &*modhost_module_entry() };
        let null = core::ptr::null_mut();
        assert_eq!(unsafe { (raw.enable)(null, null) }, HOOK_FAILED);
        assert_eq!(unsafe { (raw.disable)(null, null) }, HOOK_FAILED);
        unsafe { (raw.destroy)(null) };
    }
}
