/*!
 * LockGuard Tests
 */

use futex_sync::{
    BinarySemaphore, FutexMutex, FutexSemaphore, LockGuard, RawLock, SharingMode, SpinPolicy,
    SyncError, SyncResult,
};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Counts calls and can be told to fail the next unlock
#[derive(Default)]
struct ScriptedLock {
    locks: AtomicU32,
    unlocks: AtomicU32,
    fail_unlock: AtomicU32,
}

impl RawLock for ScriptedLock {
    fn lock(&self) -> SyncResult<()> {
        self.locks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn unlock(&self) -> SyncResult<()> {
        self.unlocks.fetch_add(1, Ordering::SeqCst);
        if self.fail_unlock.swap(0, Ordering::SeqCst) != 0 {
            return Err(SyncError::NotLocked);
        }
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "scripted"
    }
}

#[test]
fn test_guard_releases_mutex_on_scope_exit() {
    let mutex = FutexMutex::new(SharingMode::InProcess, SpinPolicy::disabled()).unwrap();
    {
        let _guard = LockGuard::new(&mutex).unwrap();
        assert!(mutex.is_locked());
    }
    assert!(!mutex.is_locked());
    assert!(mutex.try_lock());
    mutex.unlock().unwrap();
}

#[test]
fn test_guard_pairs_lock_and_unlock() {
    let lock = ScriptedLock::default();
    for _ in 0..3 {
        let _guard = LockGuard::new(&lock).unwrap();
    }
    assert_eq!(lock.locks.load(Ordering::SeqCst), 3);
    assert_eq!(lock.unlocks.load(Ordering::SeqCst), 3);
}

#[test]
fn test_guard_drop_swallows_unlock_failure() {
    let lock = ScriptedLock::default();
    {
        let _guard = LockGuard::new(&lock).unwrap();
        lock.fail_unlock.store(1, Ordering::SeqCst);
    }
    // Reached without panicking
    assert_eq!(lock.unlocks.load(Ordering::SeqCst), 1);
}

#[test]
fn test_guard_over_trait_object() {
    let mutex = FutexMutex::new(SharingMode::InProcess, SpinPolicy::disabled()).unwrap();
    let raw: &dyn RawLock = &mutex;
    {
        let guard = LockGuard::new(raw).unwrap();
        assert!(format!("{:?}", guard).contains("futex_mutex"));
        assert!(mutex.is_locked());
    }
    assert!(!mutex.is_locked());
}

#[test]
fn test_guard_holds_semaphore_slot() {
    let sem = FutexSemaphore::new(SharingMode::InProcess, 1).unwrap();
    {
        let _guard = LockGuard::new(&sem).unwrap();
        assert_eq!(sem.count(), 1);
        assert!(!sem.wait_for(Duration::from_millis(10)).unwrap());
    }
    assert_eq!(sem.count(), 0);

    let binary = BinarySemaphore::new(SharingMode::InProcess).unwrap();
    {
        let _guard = LockGuard::new(&binary).unwrap();
        assert_eq!(binary.count(), 1);
    }
    assert_eq!(binary.count(), 0);
}
