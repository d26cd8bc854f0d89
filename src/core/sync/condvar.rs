/*!
 * Futex Condition Variable
 *
 * Generation-counter condition variable. The futex word is a counter bumped
 * on every notify; a waiter blocks on the value it saw before releasing the
 * caller's lock, so a notify racing with the release makes the futex wait
 * return immediately instead of being lost.
 *
 * # Design
 *
 * - An internal mutex guards the generation counter and the waiter count;
 *   it is never the caller's lock and is never held while taking it
 * - `notify_*` skips the wake syscall when nobody is waiting
 * - No requeue: notified waiters are fully woken and race for the caller's
 *   lock
 * - Wake order is whatever the kernel picks
 *
 * Spurious returns are possible; the predicate forms re-check the caller's
 * condition under the caller's lock.
 */

use super::config::{SharingMode, SpinPolicy};
use super::deadline::Deadline;
use super::futex::{Futex, WaitOutcome};
use super::mutex::FutexMutex;
use crate::core::errors::SyncResult;
use crate::core::guard::{LockGuard, RawLock, UniqueLock};
use crate::core::limits::FUTEX_WAKE_ALL;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Result of a timed condition wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CvStatus {
    /// Returned before the deadline (notified or spurious)
    NoTimeout,
    /// The deadline elapsed first
    Timeout,
}

impl CvStatus {
    #[inline]
    pub fn timed_out(self) -> bool {
        matches!(self, Self::Timeout)
    }
}

/// Condition variable over the futex primitive
///
/// Works with any [`RawLock`] held through a [`UniqueLock`], normally a
/// [`FutexMutex`]. `#[repr(C)]` with no heap pointers, so it can live in a
/// shared mapping.
#[repr(C)]
pub struct FutexCondvar {
    internal: FutexMutex,
    generation: AtomicU32,
    waiters: AtomicU32,
    futex: Futex,
}

impl FutexCondvar {
    pub fn new(mode: SharingMode) -> SyncResult<Self> {
        let internal = FutexMutex::new(mode, SpinPolicy::disabled())?;
        tracing::debug!(?mode, "futex condvar created");

        Ok(Self {
            internal,
            generation: AtomicU32::new(0),
            waiters: AtomicU32::new(0),
            futex: Futex::new(mode),
        })
    }

    /// Release `lock`, block until notified, then reacquire `lock`
    ///
    /// May return spuriously. If reacquiring `lock` fails, the lock is
    /// released from the wrapper (its ownership record is abandoned) and the
    /// error is returned.
    pub fn wait<L: RawLock + ?Sized>(&self, lock: &mut UniqueLock<'_, L>) -> SyncResult<()> {
        self.wait_inner(lock, None).map(|_| ())
    }

    /// Wait until `condition` returns true
    ///
    /// `condition` is evaluated with `lock` held.
    pub fn wait_until<L, F>(&self, lock: &mut UniqueLock<'_, L>, mut condition: F) -> SyncResult<()>
    where
        L: RawLock + ?Sized,
        F: FnMut() -> bool,
    {
        while !condition() {
            self.wait(lock)?;
        }
        Ok(())
    }

    /// Like [`wait`](Self::wait), giving up after `timeout`
    pub fn wait_for<L: RawLock + ?Sized>(
        &self,
        lock: &mut UniqueLock<'_, L>,
        timeout: Duration,
    ) -> SyncResult<CvStatus> {
        let deadline = Deadline::after(timeout)?;
        self.wait_deadline(lock, &deadline)
    }

    /// Like [`wait`](Self::wait), giving up at an absolute deadline
    pub fn wait_deadline<L: RawLock + ?Sized>(
        &self,
        lock: &mut UniqueLock<'_, L>,
        deadline: &Deadline,
    ) -> SyncResult<CvStatus> {
        self.wait_inner(lock, Some(deadline))
    }

    /// Wait until `condition` returns true or `timeout` elapses
    ///
    /// One deadline covers the whole call. Returns the value of `condition`
    /// at the moment the call finishes.
    pub fn wait_for_until<L, F>(
        &self,
        lock: &mut UniqueLock<'_, L>,
        timeout: Duration,
        mut condition: F,
    ) -> SyncResult<bool>
    where
        L: RawLock + ?Sized,
        F: FnMut() -> bool,
    {
        let deadline = Deadline::after(timeout)?;
        while !condition() {
            if self.wait_deadline(lock, &deadline)?.timed_out() {
                return Ok(condition());
            }
        }
        Ok(true)
    }

    /// Wake one waiter, if any
    pub fn notify_one(&self) -> SyncResult<()> {
        self.notify(1)
    }

    /// Wake every waiter
    pub fn notify_all(&self) -> SyncResult<()> {
        self.notify(FUTEX_WAKE_ALL)
    }

    /// Threads between entering a wait and reacquiring their lock
    #[inline]
    pub fn waiters(&self) -> u32 {
        self.waiters.load(Ordering::Relaxed)
    }

    /// Number of notifications that found a waiter (wrapping)
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn mode(&self) -> SharingMode {
        self.futex.mode()
    }

    fn notify(&self, count: u32) -> SyncResult<()> {
        {
            let _internal = LockGuard::new(&self.internal)?;
            if self.waiters.load(Ordering::Relaxed) == 0 {
                return Ok(());
            }
            self.generation.fetch_add(1, Ordering::Release);
        }

        let woken = self.futex.wake(&self.generation, count)?;
        tracing::trace!(woken, requested = count, "condvar notified");
        Ok(())
    }

    fn wait_inner<L: RawLock + ?Sized>(
        &self,
        lock: &mut UniqueLock<'_, L>,
        deadline: Option<&Deadline>,
    ) -> SyncResult<CvStatus> {
        let expected = self.enqueue(lock)?;
        let status = self.block(expected, deadline);

        if let Err(err) = lock.lock() {
            // Waiter count stays raised; the lock is beyond recovery anyway
            tracing::error!(error = %err, "condvar failed to reacquire lock");
            let _ = lock.release();
            return Err(err);
        }

        self.dequeue()?;
        status
    }

    /// Register as a waiter and drop the caller's lock; returns the
    /// generation to block on
    fn enqueue<L: RawLock + ?Sized>(&self, lock: &mut UniqueLock<'_, L>) -> SyncResult<u32> {
        let mut internal = UniqueLock::new(&self.internal)?;
        let expected = self.generation.load(Ordering::Relaxed);
        self.waiters.fetch_add(1, Ordering::Relaxed);

        if let Err(err) = lock.unlock() {
            self.waiters.fetch_sub(1, Ordering::Relaxed);
            return Err(err);
        }

        internal.unlock()?;
        Ok(expected)
    }

    fn dequeue(&self) -> SyncResult<()> {
        let _internal = LockGuard::new(&self.internal)?;
        self.waiters.fetch_sub(1, Ordering::Relaxed);
        Ok(())
    }

    /// Block on the generation word; EINTR and spurious wakeups re-block
    /// while the generation is unchanged
    fn block(&self, expected: u32, deadline: Option<&Deadline>) -> SyncResult<CvStatus> {
        loop {
            match self.futex.wait(&self.generation, expected, deadline)? {
                WaitOutcome::TimedOut => return Ok(CvStatus::Timeout),
                WaitOutcome::ValueChanged => return Ok(CvStatus::NoTimeout),
                WaitOutcome::Woken | WaitOutcome::Interrupted => {
                    if self.generation.load(Ordering::Acquire) != expected {
                        return Ok(CvStatus::NoTimeout);
                    }
                }
            }
        }
    }
}

impl fmt::Debug for FutexCondvar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FutexCondvar")
            .field("generation", &self.generation())
            .field("waiters", &self.waiters())
            .field("mode", &self.futex.mode())
            .finish()
    }
}
