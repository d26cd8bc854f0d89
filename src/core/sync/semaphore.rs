/*!
 * Futex Semaphore
 *
 * Counting semaphore composed from a futex mutex and condition variable.
 *
 * The counter tracks holders plus waiters. A waiter is admitted once the
 * counter is at or below the limit; `post` hands one slot back and wakes one
 * waiter. A timed-out waiter removes itself from the counter before
 * returning.
 */

use super::condvar::FutexCondvar;
use super::config::{SharingMode, SpinPolicy};
use super::mutex::FutexMutex;
use crate::core::errors::{SyncError, SyncResult};
use crate::core::guard::{LockGuard, RawLock, UniqueLock};
use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

/// Semaphore admitting at most `limit` concurrent holders
///
/// # Example
///
/// ```
/// use futex_sync::{FutexSemaphore, SharingMode};
/// use std::time::Duration;
///
/// let sem = FutexSemaphore::new(SharingMode::InProcess, 2)?;
/// sem.wait()?;
/// sem.wait()?;
/// assert!(!sem.wait_for(Duration::from_millis(10))?); // full
/// sem.post()?;
/// assert!(sem.wait_for(Duration::from_millis(10))?);
/// # Ok::<(), futex_sync::SyncError>(())
/// ```
#[repr(C)]
pub struct FutexSemaphore {
    limit: i32,
    count: AtomicI32,
    mutex: FutexMutex,
    cond: FutexCondvar,
}

impl FutexSemaphore {
    /// Create a semaphore with `limit` free slots
    ///
    /// `limit` must be greater than zero.
    pub fn new(mode: SharingMode, limit: i32) -> SyncResult<Self> {
        if limit <= 0 {
            return Err(SyncError::InvalidLimit(limit));
        }

        let sem = Self {
            limit,
            count: AtomicI32::new(0),
            mutex: FutexMutex::new(mode, SpinPolicy::disabled())?,
            cond: FutexCondvar::new(mode)?,
        };
        tracing::debug!(?mode, limit, "futex semaphore created");
        Ok(sem)
    }

    /// Take a slot, blocking until one is free
    pub fn wait(&self) -> SyncResult<()> {
        let mut lock = UniqueLock::new(&self.mutex)?;
        self.count.fetch_add(1, Ordering::Relaxed);

        let res = self.cond.wait_until(&mut lock, || self.admitted());
        if res.is_err() && lock.owns_lock() {
            self.count.fetch_sub(1, Ordering::Relaxed);
        }
        res
    }

    /// Take a slot, giving up after `timeout`
    ///
    /// Returns `false` on timeout, with the counter restored.
    pub fn wait_for(&self, timeout: Duration) -> SyncResult<bool> {
        let mut lock = UniqueLock::new(&self.mutex)?;
        self.count.fetch_add(1, Ordering::Relaxed);

        match self
            .cond
            .wait_for_until(&mut lock, timeout, || self.admitted())
        {
            Ok(true) => Ok(true),
            Ok(false) => {
                self.count.fetch_sub(1, Ordering::Relaxed);
                tracing::trace!(limit = self.limit, "semaphore wait timed out");
                Ok(false)
            }
            Err(err) => {
                if lock.owns_lock() {
                    self.count.fetch_sub(1, Ordering::Relaxed);
                }
                Err(err)
            }
        }
    }

    /// Return a slot and wake one waiter
    ///
    /// A post with nothing held or waiting is ignored.
    pub fn post(&self) -> SyncResult<()> {
        let _guard = LockGuard::new(&self.mutex)?;
        if self.count.load(Ordering::Relaxed) == 0 {
            return Ok(());
        }

        self.count.fetch_sub(1, Ordering::Relaxed);
        self.cond.notify_one()
    }

    #[inline]
    pub fn limit(&self) -> i32 {
        self.limit
    }

    /// Holders plus waiters (racy, diagnostics only)
    #[inline]
    pub fn count(&self) -> i32 {
        self.count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn mode(&self) -> SharingMode {
        self.mutex.mode()
    }

    #[inline]
    fn admitted(&self) -> bool {
        self.count.load(Ordering::Relaxed) <= self.limit
    }
}

impl RawLock for FutexSemaphore {
    fn lock(&self) -> SyncResult<()> {
        self.wait()
    }

    fn unlock(&self) -> SyncResult<()> {
        self.post()
    }

    fn kind(&self) -> &'static str {
        "futex_semaphore"
    }
}

impl fmt::Debug for FutexSemaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FutexSemaphore")
            .field("limit", &self.limit)
            .field("count", &self.count())
            .field("mode", &self.mode())
            .finish()
    }
}

/// Semaphore with a single slot
///
/// Behaves like a mutex whose contended path goes through a condition
/// variable. Not reentrant.
#[repr(transparent)]
pub struct BinarySemaphore {
    inner: FutexSemaphore,
}

impl BinarySemaphore {
    pub fn new(mode: SharingMode) -> SyncResult<Self> {
        Ok(Self {
            inner: FutexSemaphore::new(mode, 1)?,
        })
    }

    #[inline]
    pub fn wait(&self) -> SyncResult<()> {
        self.inner.wait()
    }

    #[inline]
    pub fn wait_for(&self, timeout: Duration) -> SyncResult<bool> {
        self.inner.wait_for(timeout)
    }

    #[inline]
    pub fn post(&self) -> SyncResult<()> {
        self.inner.post()
    }

    #[inline]
    pub fn count(&self) -> i32 {
        self.inner.count()
    }

    #[inline]
    pub fn mode(&self) -> SharingMode {
        self.inner.mode()
    }
}

impl RawLock for BinarySemaphore {
    fn lock(&self) -> SyncResult<()> {
        self.wait()
    }

    fn unlock(&self) -> SyncResult<()> {
        self.post()
    }

    fn kind(&self) -> &'static str {
        "binary_semaphore"
    }
}

impl fmt::Debug for BinarySemaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinarySemaphore")
            .field("count", &self.count())
            .field("mode", &self.mode())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_rejects_non_positive_limit() {
        assert_eq!(
            FutexSemaphore::new(SharingMode::InProcess, 0).unwrap_err(),
            SyncError::InvalidLimit(0)
        );
        assert_eq!(
            FutexSemaphore::new(SharingMode::InterProcess, -3).unwrap_err(),
            SyncError::InvalidLimit(-3)
        );
    }

    #[test]
    fn test_post_without_holders_is_ignored() {
        let sem = FutexSemaphore::new(SharingMode::InProcess, 1).unwrap();
        sem.post().unwrap();
        assert_eq!(sem.count(), 0);
    }

    #[test]
    fn test_timeout_restores_count() {
        let sem = FutexSemaphore::new(SharingMode::InProcess, 1).unwrap();
        sem.wait().unwrap();
        assert_eq!(sem.count(), 1);

        assert!(!sem.wait_for(Duration::from_millis(20)).unwrap());
        assert_eq!(sem.count(), 1);

        sem.post().unwrap();
        assert_eq!(sem.count(), 0);
    }

    #[test]
    fn test_post_admits_blocked_waiter() {
        let sem = Arc::new(BinarySemaphore::new(SharingMode::InProcess).unwrap());
        sem.wait().unwrap();

        let sem_clone = sem.clone();
        let handle = thread::spawn(move || sem_clone.wait_for(Duration::from_secs(2)).unwrap());

        thread::sleep(Duration::from_millis(50));
        assert_eq!(sem.count(), 2);
        sem.post().unwrap();

        assert!(handle.join().unwrap());
        assert_eq!(sem.count(), 1);
    }

    #[test]
    fn test_untimed_wait_blocks_until_post() {
        use std::sync::atomic::AtomicBool;

        let sem = Arc::new(FutexSemaphore::new(SharingMode::InProcess, 1).unwrap());
        let admitted = Arc::new(AtomicBool::new(false));
        sem.wait().unwrap();

        let handle = {
            let sem = sem.clone();
            let admitted = admitted.clone();
            thread::spawn(move || {
                sem.wait().unwrap();
                admitted.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(100));
        assert!(!admitted.load(Ordering::SeqCst));
        assert_eq!(sem.count(), 2);

        sem.post().unwrap();
        handle.join().unwrap();

        assert!(admitted.load(Ordering::SeqCst));
        assert_eq!(sem.count(), 1);
        sem.post().unwrap();
        assert_eq!(sem.count(), 0);
    }

    #[test]
    fn test_guard_over_semaphore() {
        let sem = FutexSemaphore::new(SharingMode::InProcess, 2).unwrap();
        {
            let _a = LockGuard::new(&sem).unwrap();
            let _b = LockGuard::new(&sem).unwrap();
            assert_eq!(sem.count(), 2);
            assert!(!sem.wait_for(Duration::ZERO).unwrap());
        }
        assert_eq!(sem.count(), 0);
        assert_eq!(sem.kind(), "futex_semaphore");
    }
}
