/*!
 * Futex Wait/Wake Primitive
 *
 * Thin wrapper over the Linux futex syscall on a 32-bit atomic word.
 *
 * # Design
 *
 * - `wait` blocks only while the word still holds the expected value
 * - `wake` unblocks up to N threads blocked on the same word
 * - The sharing mode picks private keys (per address space) or shared keys
 *   (per physical page), nothing else changes
 * - No retries here: callers re-check their own state after every return
 */

use super::config::SharingMode;
use super::deadline::Deadline;
use crate::core::errors::{SyncError, SyncResult};
use crate::core::hints::unlikely;
use crate::core::limits::{FUTEX_BITSET_MATCH_ANY, FUTEX_WAKE_ALL};
use nix::errno::Errno;
use std::ptr;
use std::sync::atomic::AtomicU32;

/// How a single futex wait returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Woken by `wake` (or spuriously)
    Woken,
    /// The word no longer held the expected value (EAGAIN)
    ValueChanged,
    /// A signal interrupted the wait (EINTR)
    Interrupted,
    /// The deadline passed (ETIMEDOUT)
    TimedOut,
}

impl WaitOutcome {
    #[inline]
    pub fn is_timeout(self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

/// Futex operations bound to a sharing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct Futex {
    mode: SharingMode,
}

impl Futex {
    pub const fn new(mode: SharingMode) -> Self {
        Self { mode }
    }

    #[inline]
    pub const fn mode(&self) -> SharingMode {
        self.mode
    }

    #[inline(always)]
    const fn op(&self, op: libc::c_int) -> libc::c_int {
        match self.mode {
            SharingMode::InProcess => op | libc::FUTEX_PRIVATE_FLAG,
            SharingMode::InterProcess => op,
        }
    }

    /// Block while `word == expected`, optionally until an absolute deadline
    ///
    /// Spurious returns are possible; the caller must re-check its condition.
    pub fn wait(
        &self,
        word: &AtomicU32,
        expected: u32,
        deadline: Option<&Deadline>,
    ) -> SyncResult<WaitOutcome> {
        let res = match deadline {
            // SAFETY: `word` is a live, aligned 32-bit atomic for the duration
            // of the call and the timespec outlives it.
            Some(deadline) => unsafe {
                libc::syscall(
                    libc::SYS_futex,
                    word as *const AtomicU32,
                    self.op(libc::FUTEX_WAIT_BITSET),
                    expected,
                    deadline.as_timespec() as *const libc::timespec,
                    ptr::null::<u32>(),
                    FUTEX_BITSET_MATCH_ANY,
                )
            },
            // SAFETY: as above; a null timeout blocks indefinitely.
            None => unsafe {
                libc::syscall(
                    libc::SYS_futex,
                    word as *const AtomicU32,
                    self.op(libc::FUTEX_WAIT),
                    expected,
                    ptr::null::<libc::timespec>(),
                )
            },
        };

        if res == 0 {
            return Ok(WaitOutcome::Woken);
        }

        match Errno::last() {
            Errno::EAGAIN => Ok(WaitOutcome::ValueChanged),
            Errno::EINTR => Ok(WaitOutcome::Interrupted),
            Errno::ETIMEDOUT => Ok(WaitOutcome::TimedOut),
            errno => {
                tracing::error!(mode = ?self.mode, %errno, "futex wait failed");
                Err(SyncError::kernel("futex_wait", errno))
            }
        }
    }

    /// Wake up to `count` waiters blocked on `word`, returning how many woke
    pub fn wake(&self, word: &AtomicU32, count: u32) -> SyncResult<usize> {
        let count = count.min(FUTEX_WAKE_ALL) as libc::c_int;

        // SAFETY: `word` is a live, aligned 32-bit atomic; FUTEX_WAKE never
        // dereferences the remaining arguments.
        let res = unsafe {
            libc::syscall(
                libc::SYS_futex,
                word as *const AtomicU32,
                self.op(libc::FUTEX_WAKE),
                count,
            )
        };

        if unlikely(res < 0) {
            let errno = Errno::last();
            tracing::error!(mode = ?self.mode, %errno, "futex wake failed");
            return Err(SyncError::kernel("futex_wake", errno));
        }

        Ok(res as usize)
    }

    #[inline]
    pub fn wake_one(&self, word: &AtomicU32) -> SyncResult<usize> {
        self.wake(word, 1)
    }

    #[inline]
    pub fn wake_all(&self, word: &AtomicU32) -> SyncResult<usize> {
        self.wake(word, FUTEX_WAKE_ALL)
    }
}
