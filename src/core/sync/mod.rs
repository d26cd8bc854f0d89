/*!
 * Synchronization Primitives
 *
 * Mutex, condition variable and semaphores built directly on the Linux
 * futex syscall:
 * - `Futex`: wait-on-address / wake-address on a 32-bit word
 * - `FutexMutex`: three-state lock word with optional spinning
 * - `FutexCondvar`: generation-counter condition variable
 * - `FutexSemaphore` / `BinarySemaphore`: bounded holders
 *
 * # Architecture
 *
 * Layers only depend downwards: the condition variable uses the mutex and
 * the futex, the semaphore uses the mutex and the condition variable.
 *
 * # Sharing
 *
 * Every primitive takes a `SharingMode`. `InProcess` uses private futexes;
 * `InterProcess` uses shared futexes and expects the instance to live in a
 * shared mapping (see `placement`).
 *
 * # Performance
 *
 * - Uncontended lock/unlock never enter the kernel
 * - `notify_*` and `post` skip the wake syscall when nobody waits
 * - Optional bounded spin before blocking on multi-core machines
 */

mod condvar;
mod config;
mod deadline;
mod futex;
mod mutex;
pub mod placement;
mod semaphore;

pub use condvar::{CvStatus, FutexCondvar};
pub use config::{SharingMode, SpinPolicy, SyncConfig};
pub use deadline::Deadline;
pub use futex::{Futex, WaitOutcome};
pub use mutex::FutexMutex;
pub use semaphore::{BinarySemaphore, FutexSemaphore};
