/*!
 * Futex Mutex
 *
 * Three-state lock word, after Drepper's "Futexes Are Tricky" (mutex #3):
 *
 * - `0` unlocked
 * - `1` locked, no waiters
 * - `2` locked, waiters may be blocked in the kernel
 *
 * # Performance
 *
 * - Uncontended `lock` is one CAS, uncontended `unlock` one `fetch_sub`
 * - `unlock` only enters the kernel when the word was `2`
 * - Optional bounded spin before blocking, only on multi-core machines
 */

use super::config::{SharingMode, SpinPolicy, SyncConfig};
use super::futex::Futex;
use crate::core::errors::{SyncError, SyncResult};
use crate::core::guard::RawLock;
use crate::core::hints::{cpu_relax, likely, unlikely};
use crate::core::limits::{MUTEX_LOCKED_HAS_WAITERS, MUTEX_LOCKED_NO_WAITERS, MUTEX_UNLOCKED};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Whether the target has a native lock-free 32-bit atomic
const STATE_WORD_LOCK_FREE: bool = cfg!(target_has_atomic = "32");

/// Mutual exclusion lock on a single futex word
///
/// Not reentrant and not fair. Holds no data: pair it with a
/// [`LockGuard`](crate::core::guard::LockGuard) or
/// [`UniqueLock`](crate::core::guard::UniqueLock).
///
/// `#[repr(C)]` with no heap pointers, so an instance placed in a shared
/// mapping works from every process that maps it.
#[repr(C)]
pub struct FutexMutex {
    state: AtomicU32,
    futex: Futex,
    spin: SpinPolicy,
}

impl FutexMutex {
    /// Create an unlocked mutex
    pub fn new(mode: SharingMode, spin: SpinPolicy) -> SyncResult<Self> {
        if !STATE_WORD_LOCK_FREE {
            return Err(SyncError::NotLockFree);
        }

        tracing::debug!(?mode, spin = spin.should_spin(), "futex mutex created");

        Ok(Self {
            state: AtomicU32::new(MUTEX_UNLOCKED),
            futex: Futex::new(mode),
            spin,
        })
    }

    /// Create an unlocked mutex from a [`SyncConfig`]
    pub fn with_config(config: &SyncConfig) -> SyncResult<Self> {
        Self::new(config.sharing, config.spin)
    }

    /// Acquire the lock, blocking while another holder has it
    pub fn lock(&self) -> SyncResult<()> {
        if self.spin.should_spin() && self.spin_lock() {
            return Ok(());
        }

        let mut prev = match self.state.compare_exchange(
            MUTEX_UNLOCKED,
            MUTEX_LOCKED_NO_WAITERS,
            Ordering::Acquire,
            Ordering::Relaxed,
        ) {
            Ok(_) => return Ok(()),
            Err(prev) => prev,
        };

        // Announce a waiter; if the holder left meanwhile we own the lock
        if prev != MUTEX_LOCKED_HAS_WAITERS {
            prev = self.state.swap(MUTEX_LOCKED_HAS_WAITERS, Ordering::Acquire);
        }

        while prev != MUTEX_UNLOCKED {
            tracing::trace!(mode = ?self.futex.mode(), "mutex contended, blocking");
            // Every outcome means "look again"; the swap re-checks real state
            self.futex
                .wait(&self.state, MUTEX_LOCKED_HAS_WAITERS, None)?;
            prev = self.state.swap(MUTEX_LOCKED_HAS_WAITERS, Ordering::Acquire);
        }

        Ok(())
    }

    /// Try to acquire the lock without blocking or spinning
    #[inline]
    pub fn try_lock(&self) -> bool {
        self.state
            .compare_exchange(
                MUTEX_UNLOCKED,
                MUTEX_LOCKED_NO_WAITERS,
                Ordering::Acquire,
                Ordering::Relaxed,
            )
            .is_ok()
    }

    /// Release the lock
    ///
    /// Must only be called by the current holder. Unlocking a mutex nobody
    /// holds is a contract violation: it is detected off the fast path and
    /// reported as `NotLocked` after the state word is reset, but a thread
    /// locking concurrently may have observed the transient wrapped value.
    pub fn unlock(&self) -> SyncResult<()> {
        let prev = self.state.fetch_sub(1, Ordering::Release);

        if likely(prev == MUTEX_LOCKED_NO_WAITERS) {
            return Ok(());
        }

        self.state.store(MUTEX_UNLOCKED, Ordering::Release);
        if unlikely(prev == MUTEX_UNLOCKED) {
            tracing::error!(mode = ?self.futex.mode(), "unlock of an unlocked futex mutex");
            // A locker that saw the wrapped word is parked on it
            self.futex.wake_one(&self.state)?;
            return Err(SyncError::NotLocked);
        }

        self.futex.wake_one(&self.state)?;
        Ok(())
    }

    /// Whether some thread currently holds the lock (racy, diagnostics only)
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.state.load(Ordering::Relaxed) != MUTEX_UNLOCKED
    }

    #[inline]
    pub fn mode(&self) -> SharingMode {
        self.futex.mode()
    }

    #[inline]
    pub fn spin_policy(&self) -> SpinPolicy {
        self.spin
    }

    fn spin_lock(&self) -> bool {
        for _ in 0..self.spin.iterations {
            if self.state.load(Ordering::Relaxed) == MUTEX_UNLOCKED && self.try_lock() {
                return true;
            }
            cpu_relax();
        }

        false
    }
}

impl RawLock for FutexMutex {
    #[inline]
    fn lock(&self) -> SyncResult<()> {
        FutexMutex::lock(self)
    }

    #[inline]
    fn unlock(&self) -> SyncResult<()> {
        FutexMutex::unlock(self)
    }

    fn kind(&self) -> &'static str {
        "futex_mutex"
    }
}

impl fmt::Debug for FutexMutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FutexMutex")
            .field("state", &self.state.load(Ordering::Relaxed))
            .field("mode", &self.futex.mode())
            .field("spin", &self.spin)
            .finish()
    }
}
