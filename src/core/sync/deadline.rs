/*!
 * Absolute Deadlines
 *
 * Timed futex waits take an absolute CLOCK_MONOTONIC timestamp, so a wait
 * that is interrupted and re-issued keeps the original deadline instead of
 * restarting its timeout.
 */

use crate::core::errors::{SyncError, SyncResult};
use nix::sys::time::TimeSpec;
use nix::time::{clock_gettime, ClockId};
use std::cmp::Ordering;
use std::time::Duration;

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// A point on the monotonic clock after which a wait gives up
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: TimeSpec,
}

impl Deadline {
    /// The current monotonic time
    pub fn now() -> SyncResult<Self> {
        let at = clock_gettime(ClockId::CLOCK_MONOTONIC)
            .map_err(|errno| SyncError::kernel("clock_gettime", errno))?;
        Ok(Self { at })
    }

    /// `timeout` from now, saturating far in the future
    pub fn after(timeout: Duration) -> SyncResult<Self> {
        let now = Self::now()?.at;

        let secs = i64::try_from(timeout.as_secs()).unwrap_or(i64::MAX);
        let mut sec = (now.tv_sec() as i64).saturating_add(secs);
        let mut nsec = now.tv_nsec() as i64 + i64::from(timeout.subsec_nanos());
        if nsec >= NANOS_PER_SEC {
            nsec -= NANOS_PER_SEC;
            sec = sec.saturating_add(1);
        }

        Ok(Self {
            at: TimeSpec::new(sec as _, nsec as _),
        })
    }

    /// Whether the monotonic clock has passed this deadline
    pub fn has_elapsed(&self) -> SyncResult<bool> {
        Ok(Self::now()? >= *self)
    }

    /// Time left before the deadline, zero once it has passed
    pub fn remaining(&self) -> SyncResult<Duration> {
        let now = Self::now()?;
        if now >= *self {
            return Ok(Duration::ZERO);
        }

        let (sec, nsec) = self.parts();
        let (now_sec, now_nsec) = now.parts();
        let total = (sec - now_sec) as i128 * NANOS_PER_SEC as i128 + (nsec - now_nsec) as i128;
        Ok(Duration::from_nanos(u64::try_from(total).unwrap_or(u64::MAX)))
    }

    /// Kernel representation passed to FUTEX_WAIT_BITSET
    #[inline]
    pub(crate) fn as_timespec(&self) -> &libc::timespec {
        self.at.as_ref()
    }

    #[inline]
    fn parts(&self) -> (i64, i64) {
        (self.at.tv_sec() as i64, self.at.tv_nsec() as i64)
    }
}

impl PartialEq for Deadline {
    fn eq(&self, other: &Self) -> bool {
        self.parts() == other.parts()
    }
}

impl Eq for Deadline {}

impl PartialOrd for Deadline {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Deadline {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts().cmp(&other.parts())
    }
}
