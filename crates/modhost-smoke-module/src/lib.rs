//! Smoke-test module.
//!
//! Each enable bumps an enable counter that is static data of this library
//! image and reports the new count to the host through a `Vec<u32>`
//! context; disable removes the report again. Two copies of the archive
//! load as two images with two independent counters, so a host that loads
//! both sees each copy report a count of 1.

use std::sync::atomic::{AtomicU32, Ordering};

use modhost_sdk::prelude::*;

/// Enable count local to this library image.
static ENABLE_COUNT: AtomicU32 = AtomicU32::new(0);

#[derive(Default)]
struct SmokeModule;

impl Loadable<Vec<u32>> for SmokeModule {
    fn on_enable(&mut self, host: &mut Vec<u32>) -> HookResult {
        host.push(ENABLE_COUNT.fetch_add(1, Ordering::SeqCst) + 1);
        Ok(())
    }

    fn on_disable(&mut self, host: &mut Vec<u32>) -> HookResult {
        host.pop();
        Ok(())
    }
}

export_module!(SmokeModule, Vec<u32>, name: "smoke", author: "modhost tests");
