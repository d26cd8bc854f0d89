/*!
 * Shared-Memory Placement
 *
 * Cross-process primitives are built in place inside memory the caller has
 * already mapped into every participant (e.g. `shm_open` + `mmap` with
 * `MAP_SHARED`, or an anonymous shared mapping inherited across `fork`).
 * Mapping, sizing and unmapping stay with the caller.
 *
 * Once placed, the instance's address is its identity: every participant
 * refers to it through the mapping and nothing may move or copy it.
 */

use crate::core::errors::{SyncError, SyncResult};
use std::mem;
use std::ptr::NonNull;

fn check_alignment<T>(slot: NonNull<T>) -> SyncResult<()> {
    let addr = slot.as_ptr() as usize;
    let align = mem::align_of::<T>();
    if addr % align != 0 {
        return Err(SyncError::Misaligned { addr, align });
    }
    Ok(())
}

/// Construct `value` in place at `slot` and return a reference to it
///
/// # Safety
///
/// - `slot` must point to writable memory of at least `size_of::<T>()` bytes
///   that stays mapped for `'a`
/// - no other participant may use the slot until this call returns
/// - any previous value at `slot` is overwritten without being dropped
pub unsafe fn place<'a, T>(slot: NonNull<T>, value: T) -> SyncResult<&'a T> {
    check_alignment(slot)?;

    // SAFETY: caller guarantees the slot is valid for writes and unshared;
    // alignment was checked above.
    unsafe { slot.as_ptr().write(value) };
    tracing::debug!(
        addr = slot.as_ptr() as usize,
        size = mem::size_of::<T>(),
        "primitive placed in shared memory"
    );

    // SAFETY: the value was just initialized and lives as long as the mapping.
    Ok(unsafe { &*slot.as_ptr() })
}

/// View a `T` that another participant already placed at `slot`
///
/// # Safety
///
/// - `slot` must hold a `T` initialized by [`place`] in the same backing
///   object, and stay mapped for `'a`
pub unsafe fn attach<'a, T>(slot: NonNull<T>) -> SyncResult<&'a T> {
    check_alignment(slot)?;

    // SAFETY: caller guarantees the slot holds an initialized `T`.
    Ok(unsafe { &*slot.as_ptr() })
}
