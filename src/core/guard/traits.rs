/*!
 * Guard Traits
 *
 * Core abstraction for anything a scoped guard can lock
 */

use crate::core::errors::SyncResult;

/// A lock with explicit acquire/release, usable behind [`LockGuard`] and
/// [`UniqueLock`]
///
/// Implemented by the futex mutex and both semaphores (`lock` = wait,
/// `unlock` = post).
///
/// [`LockGuard`]: super::LockGuard
/// [`UniqueLock`]: super::UniqueLock
pub trait RawLock: Sync {
    /// Acquire, blocking if necessary
    fn lock(&self) -> SyncResult<()>;

    /// Release; only the current holder may call this
    fn unlock(&self) -> SyncResult<()>;

    /// Lock type name for logging/debugging
    fn kind(&self) -> &'static str;
}
