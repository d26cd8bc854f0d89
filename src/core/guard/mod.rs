/*!
 * RAII Lock Guards
 *
 * Scope-bound acquisition for every futex primitive that can be locked.
 *
 * ## Guard Types
 *
 * - **LockGuard**: lock on construction, unlock on drop, nothing else
 * - **UniqueLock**: manual `lock`/`unlock` with misuse detection and
 *   `release` to detach without unlocking
 *
 * ## Example
 *
 * ```rust
 * use futex_sync::{FutexMutex, SharingMode, SpinPolicy, UniqueLock};
 *
 * let mutex = FutexMutex::new(SharingMode::InProcess, SpinPolicy::disabled())?;
 * let mut lock = UniqueLock::new(&mutex)?;
 * lock.unlock()?;
 * assert!(lock.unlock().is_err()); // not owned any more
 * # Ok::<(), futex_sync::SyncError>(())
 * ```
 */

mod lock;
mod traits;

pub use lock::{LockGuard, UniqueLock};
pub use traits::RawLock;
