/*!
 * Limits and Constants
 *
 * Centralized location for futex operation values, spin tunables and the
 * mutex state encoding.
 *
 * - Performance-critical constants are marked with [PERF]
 * - Values fixed by the Linux ABI are marked with [LINUX-COMPAT]
 */

// =============================================================================
// MUTEX STATE WORD
// =============================================================================

/// Nobody holds the lock
pub const MUTEX_UNLOCKED: u32 = 0;

/// Held, and no thread has announced that it is blocked
pub const MUTEX_LOCKED_NO_WAITERS: u32 = 1;

/// Held, and at least one thread may be blocked in the kernel
/// [PERF] Only this state makes `unlock` issue a wake syscall
pub const MUTEX_LOCKED_HAS_WAITERS: u32 = 2;

// =============================================================================
// SPINNING
// =============================================================================

/// Spin iterations before a contended `lock` falls back to the kernel
/// [PERF] Matches the short spin used by musl before blocking
pub const DEFAULT_SPIN_ITERATIONS: u32 = 100;

/// Environment variable overriding the spin iteration count (0 disables)
pub const SPIN_ITERATIONS_ENV: &str = "FUTEX_SYNC_SPIN_ITERATIONS";

// =============================================================================
// FUTEX
// =============================================================================

/// Largest waiter count a single FUTEX_WAKE accepts
/// [LINUX-COMPAT] The kernel takes the count as a signed int
pub const FUTEX_WAKE_ALL: u32 = i32::MAX as u32;

/// Bitset matching every waiter for FUTEX_WAIT_BITSET
/// [LINUX-COMPAT] FUTEX_BITSET_MATCH_ANY
pub const FUTEX_BITSET_MATCH_ANY: u32 = u32::MAX;
