/*!
 * Core Module
 * Synchronization primitives, lock guards and error handling
 */

pub mod errors;
pub mod guard;
pub mod hints;
pub mod limits;
pub mod sync;

// Re-export for convenience
pub use errors::*;
pub use guard::{LockGuard, RawLock, UniqueLock};
pub use sync::{
    BinarySemaphore, CvStatus, Deadline, FutexCondvar, FutexMutex, FutexSemaphore, SharingMode,
    SpinPolicy, SyncConfig,
};
