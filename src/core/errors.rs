/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 *
 * Errors fall into three kinds (see [`ErrorKind`]):
 * - Construction: the object could not be built and must not be used
 * - Kernel: a futex or clock syscall failed for a non-transient reason
 * - Usage: the caller broke the locking protocol
 *
 * Spurious wakeups, EINTR, EAGAIN and elapsed deadlines are never errors.
 */

use miette::Diagnostic;
use nix::errno::Errno;
use thiserror::Error;

/// Result type for synchronization operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Broad classification of a [`SyncError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Object construction or placement failed
    Construction,
    /// A syscall failed in a way that cannot be retried
    Kernel,
    /// Caller bug: lock protocol violated
    Usage,
}

/// Synchronization errors with miette diagnostics
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum SyncError {
    #[error("Semaphore limit must be greater than zero, got {0}")]
    #[diagnostic(
        code(sync::invalid_limit),
        help("Pass the maximum number of simultaneous holders (1 for a binary semaphore).")
    )]
    InvalidLimit(i32),

    #[error("Platform cannot provide a lock-free 32-bit atomic state word")]
    #[diagnostic(
        code(sync::not_lock_free),
        help("Futex-based primitives need native 32-bit atomics on the target.")
    )]
    NotLockFree,

    #[error("Address {addr:#x} is not aligned to {align} bytes")]
    #[diagnostic(
        code(sync::misaligned),
        help("Place primitives at an offset that satisfies their alignment inside the mapping.")
    )]
    Misaligned { addr: usize, align: usize },

    #[error("{op} failed: {errno}")]
    #[diagnostic(
        code(sync::kernel),
        help("The kernel rejected the call. Check that the shared mapping is still valid.")
    )]
    Kernel { op: &'static str, errno: Errno },

    #[error("Lock is already owned by this guard")]
    #[diagnostic(
        code(sync::already_locked),
        help("Unlock before locking again; locks are not recursive.")
    )]
    AlreadyLocked,

    #[error("Lock is not owned by this guard")]
    #[diagnostic(code(sync::not_locked), help("Only the owning guard may unlock."))]
    NotLocked,

    #[error("Guard no longer references a lock")]
    #[diagnostic(
        code(sync::null_lock),
        help("The guard was released; the caller that took the lock now owns it.")
    )]
    NullLock,
}

impl SyncError {
    /// Classify the error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidLimit(_) | Self::NotLockFree | Self::Misaligned { .. } => {
                ErrorKind::Construction
            }
            Self::Kernel { .. } => ErrorKind::Kernel,
            Self::AlreadyLocked | Self::NotLocked | Self::NullLock => ErrorKind::Usage,
        }
    }

    #[inline]
    pub(crate) const fn kernel(op: &'static str, errno: Errno) -> Self {
        Self::Kernel { op, errno }
    }

    /// Whether the error indicates a caller bug
    #[inline]
    pub const fn is_usage(&self) -> bool {
        matches!(self.kind(), ErrorKind::Usage)
    }
}

impl From<Errno> for SyncError {
    fn from(errno: Errno) -> Self {
        Self::kernel("syscall", errno)
    }
}
