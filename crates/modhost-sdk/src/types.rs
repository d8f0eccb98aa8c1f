//! The lifecycle capability module authors implement.

use crate::error::HookResult;

/// A loadable unit: any component a host can turn on and off.
///
/// `C` is the host context type. The host passes the same context object,
/// unchanged, to every lifecycle call; it is the only channel between a
/// module and its host. Both sides must be compiled against the same `C` -
/// the loader cannot verify this across the library boundary.
pub trait Loadable<C> {
    /// Called once after the unit has been constructed.
    fn on_enable(&mut self, host: &mut C) -> HookResult;

    /// Called once before the unit is destroyed and its archive released.
    fn on_disable(&mut self, host: &mut C) -> HookResult;
}
