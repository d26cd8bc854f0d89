/*!
 * Shared Region Helper
 * Anonymous MAP_SHARED mapping inherited across fork
 */

use futex_sync::placement;
use nix::sys::mman::{mmap_anonymous, munmap, MapFlags, ProtFlags};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{fork, ForkResult, Pid};
use std::ffi::c_void;
use std::mem;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::ptr::NonNull;

/// One `T` placed in memory shared with forked children
pub struct SharedRegion<T> {
    base: NonNull<c_void>,
    len: usize,
    value: NonNull<T>,
}

impl<T> SharedRegion<T> {
    pub fn new(value: T) -> Self {
        let len = mem::size_of::<T>().max(1);
        let length = NonZeroUsize::new(len).unwrap();

        // SAFETY: fresh anonymous mapping, no existing memory is aliased
        let base = unsafe {
            mmap_anonymous(
                None,
                length,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
            )
        }
        .expect("mmap shared region");

        let slot = base.cast::<T>();
        // SAFETY: the mapping is page aligned, large enough and unshared yet
        unsafe { placement::place(slot, value) }.expect("place value");

        Self {
            base,
            len,
            value: slot,
        }
    }

    pub fn get(&self) -> &T {
        // SAFETY: placed in `new`, mapped until drop
        unsafe { placement::attach(self.value) }.expect("attach value")
    }
}

impl<T> Drop for SharedRegion<T> {
    fn drop(&mut self) {
        // SAFETY: every child has exited by the time the parent drops it
        unsafe {
            self.value.as_ptr().drop_in_place();
            let _ = munmap(self.base, self.len);
        }
    }
}

/// Fork a child that runs `body` and exits with its status
///
/// The child never returns into the test harness. A panic maps to 101.
pub fn spawn_child<F>(body: F) -> Pid
where
    F: FnOnce() -> i32,
{
    // SAFETY: the child only touches the shared region and sleeps before
    // calling `_exit`
    match unsafe { fork() }.expect("fork") {
        ForkResult::Child => {
            let code = panic::catch_unwind(AssertUnwindSafe(body)).unwrap_or(101);
            // SAFETY: skips atexit handlers inherited from the harness
            unsafe { libc::_exit(code) }
        }
        ForkResult::Parent { child } => child,
    }
}

/// Wait for `child` and return its exit code
pub fn join_child(child: Pid) -> i32 {
    match waitpid(child, None).expect("waitpid") {
        WaitStatus::Exited(_, code) => code,
        other => panic!("child ended abnormally: {:?}", other),
    }
}
