/*!
 * Synchronization Configuration
 *
 * Sharing mode and spin tunables, passed explicitly to constructors
 */

use crate::core::limits::{DEFAULT_SPIN_ITERATIONS, SPIN_ITERATIONS_ENV};

/// Which processes may synchronize through a primitive
///
/// Fixed at construction. Selects private or shared futex operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum SharingMode {
    /// Threads of one process (FUTEX_PRIVATE_FLAG)
    #[default]
    InProcess = 1,
    /// Threads of any process mapping the same memory
    InterProcess = 2,
}

impl SharingMode {
    #[inline]
    pub const fn is_shared(self) -> bool {
        matches!(self, Self::InterProcess)
    }
}

/// Bounded spinning before a contended lock blocks in the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinPolicy {
    /// Spinning requested by the caller
    pub enabled: bool,
    /// Maximum CAS attempts before blocking
    pub iterations: u32,
    /// More than one execution unit is available
    pub multi_core: bool,
}

impl SpinPolicy {
    /// Never spin
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            iterations: 0,
            multi_core: false,
        }
    }

    /// Spin up to `iterations` times, assuming a multi-core machine
    pub const fn spinning(iterations: u32) -> Self {
        Self {
            enabled: true,
            iterations,
            multi_core: true,
        }
    }

    /// Spin with the default iteration count if this machine has more than one CPU
    ///
    /// On a single CPU the lock holder cannot make progress while we spin.
    pub fn detect() -> Self {
        let multi_core = std::thread::available_parallelism()
            .map(|n| n.get() > 1)
            .unwrap_or(false);

        Self {
            enabled: true,
            iterations: DEFAULT_SPIN_ITERATIONS,
            multi_core,
        }
    }

    /// Like [`SpinPolicy::detect`], with the iteration count taken from
    /// `FUTEX_SYNC_SPIN_ITERATIONS` when set (`0` disables spinning)
    pub fn from_env() -> Self {
        let detected = Self::detect();
        match std::env::var(SPIN_ITERATIONS_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
        {
            Some(0) => Self::disabled(),
            Some(iterations) => Self {
                iterations,
                ..detected
            },
            None => detected,
        }
    }

    /// Whether `lock` should run the spin phase at all
    #[inline(always)]
    pub const fn should_spin(&self) -> bool {
        self.enabled && self.multi_core && self.iterations > 0
    }
}

impl Default for SpinPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Synchronization configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncConfig {
    /// Process sharing mode
    pub sharing: SharingMode,
    /// Spin behaviour of mutexes built from this config
    pub spin: SpinPolicy,
}

impl SyncConfig {
    /// Threads of one process, no spinning
    pub const fn in_process() -> Self {
        Self {
            sharing: SharingMode::InProcess,
            spin: SpinPolicy::disabled(),
        }
    }

    /// Cooperating processes over shared memory, no spinning
    pub const fn inter_process() -> Self {
        Self {
            sharing: SharingMode::InterProcess,
            spin: SpinPolicy::disabled(),
        }
    }

    /// In-process, spinning when the machine has more than one CPU
    pub fn low_latency() -> Self {
        Self {
            sharing: SharingMode::InProcess,
            spin: SpinPolicy::detect(),
        }
    }

    /// Replace the sharing mode
    pub const fn with_sharing(mut self, sharing: SharingMode) -> Self {
        self.sharing = sharing;
        self
    }

    /// Replace the spin policy
    pub const fn with_spin(mut self, spin: SpinPolicy) -> Self {
        self.spin = spin;
        self
    }
}
