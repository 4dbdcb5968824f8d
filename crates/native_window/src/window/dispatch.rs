//! Redispatch trampoline
//!
//! Every platform hands envelopes for managed handles to [`route`]. The
//! trampoline finds the object bound to the handle through the handle's
//! user-data slot and calls its `on_event`. Envelopes for handles with no live
//! object fall through to the platform's default handling.

use crate::events::{codes, Event};
use crate::platform::{NativeHandle, Platform, TargetRef};

/// Deliver one envelope and return the protocol result
///
/// On the creation notification the creation target is recovered, bound to
/// the handle and stored in the user-data slot before its `on_event` runs. An
/// envelope that arrives while the object is being dropped (its strong count
/// already zero) gets default handling. After an object handles the destroy
/// notification the slot is cleared and the object forgets its handle, so
/// dropping it later does not destroy the handle twice.
pub fn route(platform: &dyn Platform, event: Event) -> isize {
    let handle = event.target();
    if event.code() == codes::CREATE {
        if let Some(target) = platform.take_creation_target(&event) {
            bind_on_create(platform, handle, target);
        }
    }

    let Some(target) = platform.attached(handle).and_then(|weak| weak.upgrade()) else {
        return platform.default_proc(&event);
    };

    let result = target.on_event(&event);

    if event.code() == codes::DESTROY {
        platform.detach(handle);
        target.window().forget_handle(handle);
        log::trace!("Handle {handle:?} released by its object");
    }
    result.raw()
}

fn bind_on_create(platform: &dyn Platform, handle: NativeHandle, weak: TargetRef) {
    match weak.upgrade() {
        Some(target) => {
            target.window().bind(handle);
            platform.attach(handle, weak);
            log::trace!("Bound handle {handle:?} during creation");
        }
        None => log::warn!("Creation target for {handle:?} was dropped before creation"),
    }
}
