/*!
 * Compiler and CPU Hints
 * Branch prediction hints and the busy-wait pause used by spinning locks
 */

/// Hint to the compiler that this branch is likely to be taken
///
/// # Implementation
/// On nightly with core_intrinsics, uses LLVM's `llvm.expect` intrinsic.
/// On stable, returns the value unchanged.
#[inline(always)]
#[must_use]
pub fn likely(b: bool) -> bool {
    #[cfg(feature = "nightly")]
    {
        unsafe { std::intrinsics::likely(b) }
    }
    #[cfg(not(feature = "nightly"))]
    {
        b
    }
}

/// Hint to the compiler that this branch is unlikely to be taken
///
/// Use for contended and error paths.
#[inline(always)]
#[must_use]
pub fn unlikely(b: bool) -> bool {
    #[cfg(feature = "nightly")]
    {
        unsafe { std::intrinsics::unlikely(b) }
    }
    #[cfg(not(feature = "nightly"))]
    {
        b
    }
}

/// Tell the CPU we are in a busy-wait loop
///
/// Emits `pause` on x86, `yield`/`isb` on aarch64 and nothing on targets
/// without such an instruction.
#[inline(always)]
pub fn cpu_relax() {
    std::hint::spin_loop();
}
