/*!
 * Futex Sync
 * Mutex, condition variable and semaphores on the raw Linux futex syscall
 *
 * Every primitive works either inside one process (private futexes) or
 * across processes when placed in shared memory (shared futexes). All are
 * fixed-layout values with no heap pointers, so a cross-process instance is
 * just bytes in a `MAP_SHARED` mapping.
 *
 * # Example
 *
 * ```
 * use futex_sync::{FutexCondvar, FutexMutex, SharingMode, SpinPolicy, UniqueLock};
 * use std::time::Duration;
 *
 * let mutex = FutexMutex::new(SharingMode::InProcess, SpinPolicy::disabled())?;
 * let cond = FutexCondvar::new(SharingMode::InProcess)?;
 *
 * let mut lock = UniqueLock::new(&mutex)?;
 * let ready = cond.wait_for_until(&mut lock, Duration::from_millis(10), || false)?;
 * assert!(!ready);
 * assert!(lock.owns_lock());
 * # Ok::<(), futex_sync::SyncError>(())
 * ```
 */

#![cfg_attr(feature = "nightly", feature(core_intrinsics))]
#![cfg_attr(feature = "nightly", allow(internal_features))]

#[cfg(not(any(target_os = "linux", target_os = "android")))]
compile_error!("futex-sync requires the Linux futex syscall");

pub mod core;
pub mod monitoring;

// Re-exports
pub use crate::core::errors::{ErrorKind, SyncError, SyncResult};
pub use crate::core::guard::{LockGuard, RawLock, UniqueLock};
pub use crate::core::sync::placement;
pub use crate::core::sync::{
    BinarySemaphore, CvStatus, Deadline, FutexCondvar, FutexMutex, FutexSemaphore, SharingMode,
    SpinPolicy, SyncConfig,
};
pub use monitoring::{init_tracing, try_init_tracing};
