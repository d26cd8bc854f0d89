/*!
 * Scoped Lock Guards
 *
 * - `LockGuard`: locks on construction, always unlocks on drop
 * - `UniqueLock`: explicit lock/unlock with misuse detection, and `release`
 *   to hand the lock back to the caller without unlocking
 *
 * Neither is `Clone`. Drop never panics: an unlock failure during drop is
 * logged and suppressed.
 */

use super::traits::RawLock;
use crate::core::errors::{SyncError, SyncResult};
use std::fmt;

/// Unconditional scoped lock
///
/// # Example
///
/// ```
/// use futex_sync::{FutexMutex, LockGuard, SharingMode, SpinPolicy};
///
/// let mutex = FutexMutex::new(SharingMode::InProcess, SpinPolicy::disabled())?;
/// {
///     let _guard = LockGuard::new(&mutex)?;
///     assert!(mutex.is_locked());
/// }
/// assert!(!mutex.is_locked());
/// # Ok::<(), futex_sync::SyncError>(())
/// ```
#[must_use = "dropping the guard unlocks immediately"]
pub struct LockGuard<'a, L: RawLock + ?Sized> {
    lock: &'a L,
}

impl<'a, L: RawLock + ?Sized> LockGuard<'a, L> {
    /// Acquire `lock` for the lifetime of the guard
    pub fn new(lock: &'a L) -> SyncResult<Self> {
        lock.lock()?;
        Ok(Self { lock })
    }
}

impl<L: RawLock + ?Sized> Drop for LockGuard<'_, L> {
    fn drop(&mut self) {
        if let Err(err) = self.lock.unlock() {
            tracing::error!(kind = self.lock.kind(), error = %err, "unlock on guard drop failed");
        }
    }
}

impl<L: RawLock + ?Sized> fmt::Debug for LockGuard<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockGuard")
            .field("kind", &self.lock.kind())
            .finish()
    }
}

/// Lock wrapper with manual lock/unlock and ownership release
///
/// Used by the condition variable, which must drop and retake the caller's
/// lock around a blocking wait.
#[must_use = "dropping the lock unlocks immediately"]
pub struct UniqueLock<'a, L: RawLock + ?Sized> {
    lock: Option<&'a L>,
    owns: bool,
}

impl<'a, L: RawLock + ?Sized> UniqueLock<'a, L> {
    /// Wrap `lock` and acquire it
    pub fn new(lock: &'a L) -> SyncResult<Self> {
        let mut unique = Self::deferred(lock);
        unique.lock()?;
        Ok(unique)
    }

    /// Wrap `lock` without acquiring it
    pub fn deferred(lock: &'a L) -> Self {
        Self {
            lock: Some(lock),
            owns: false,
        }
    }

    /// Acquire the wrapped lock
    ///
    /// Fails with `NullLock` after `release`, `AlreadyLocked` when owning.
    pub fn lock(&mut self) -> SyncResult<()> {
        let lock = self.lock.ok_or(SyncError::NullLock)?;
        if self.owns {
            return Err(SyncError::AlreadyLocked);
        }

        lock.lock()?;
        self.owns = true;
        Ok(())
    }

    /// Release the wrapped lock
    ///
    /// Fails with `NullLock` after `release`, `NotLocked` when not owning.
    pub fn unlock(&mut self) -> SyncResult<()> {
        let lock = self.lock.ok_or(SyncError::NullLock)?;
        if !self.owns {
            return Err(SyncError::NotLocked);
        }

        lock.unlock()?;
        self.owns = false;
        Ok(())
    }

    /// Detach from the lock without unlocking it
    ///
    /// If the lock was owned, the caller is now responsible for unlocking
    /// it. The wrapper is left empty: further `lock`/`unlock` calls fail.
    pub fn release(&mut self) -> Option<&'a L> {
        self.owns = false;
        self.lock.take()
    }

    /// Whether this wrapper currently holds the lock
    #[inline]
    pub fn owns_lock(&self) -> bool {
        self.owns
    }

    /// The wrapped lock, unless released
    #[inline]
    pub fn get(&self) -> Option<&'a L> {
        self.lock
    }
}

impl<L: RawLock + ?Sized> Drop for UniqueLock<'_, L> {
    fn drop(&mut self) {
        if !self.owns {
            return;
        }
        if let Some(lock) = self.lock {
            if let Err(err) = lock.unlock() {
                tracing::error!(kind = lock.kind(), error = %err, "unlock on unique lock drop failed");
            }
        }
    }
}

impl<L: RawLock + ?Sized> fmt::Debug for UniqueLock<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniqueLock")
            .field("kind", &self.lock.map(|l| l.kind()))
            .field("owns", &self.owns)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sync::{FutexMutex, SharingMode, SpinPolicy};

    fn mutex() -> FutexMutex {
        FutexMutex::new(SharingMode::InProcess, SpinPolicy::disabled()).unwrap()
    }

    #[test]
    fn test_lock_guard_scopes_lock() {
        let m = mutex();
        {
            let _guard = LockGuard::new(&m).unwrap();
            assert!(m.is_locked());
            assert!(!m.try_lock());
        }
        assert!(!m.is_locked());
    }

    #[test]
    fn test_unique_lock_cycle() {
        let m = mutex();
        let mut lock = UniqueLock::new(&m).unwrap();
        assert!(lock.owns_lock());

        lock.unlock().unwrap();
        assert!(!lock.owns_lock());
        assert!(!m.is_locked());

        lock.lock().unwrap();
        assert!(m.is_locked());
        drop(lock);
        assert!(!m.is_locked());
    }

    #[test]
    fn test_unique_lock_misuse_is_detected() {
        let m = mutex();
        let mut lock = UniqueLock::new(&m).unwrap();
        assert_eq!(lock.lock(), Err(SyncError::AlreadyLocked));

        lock.unlock().unwrap();
        assert_eq!(lock.unlock(), Err(SyncError::NotLocked));
    }

    #[test]
    fn test_deferred_does_not_lock() {
        let m = mutex();
        let lock = UniqueLock::deferred(&m);
        assert!(!lock.owns_lock());
        assert!(!m.is_locked());
    }

    #[test]
    fn test_release_transfers_ownership() {
        let m = mutex();
        let mut lock = UniqueLock::new(&m).unwrap();

        let released = lock.release().unwrap();
        assert!(!lock.owns_lock());
        assert!(lock.get().is_none());
        assert_eq!(lock.lock(), Err(SyncError::NullLock));
        assert_eq!(lock.unlock(), Err(SyncError::NullLock));
        drop(lock);

        // Still held: the caller took responsibility
        assert!(m.is_locked());
        released.unlock().unwrap();
        assert!(!m.is_locked());
    }
}
