/*!
 * UniqueLock Tests
 */

use futex_sync::{
    ErrorKind, FutexCondvar, FutexMutex, SharingMode, SpinPolicy, SyncError, UniqueLock,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn mutex() -> FutexMutex {
    FutexMutex::new(SharingMode::InProcess, SpinPolicy::disabled()).unwrap()
}

#[test]
fn test_deferred_then_lock() {
    let m = mutex();
    let mut lock = UniqueLock::deferred(&m);
    assert!(!lock.owns_lock());
    assert!(!m.is_locked());

    lock.lock().unwrap();
    assert!(lock.owns_lock());
    assert!(m.is_locked());
}

#[test]
fn test_double_lock_is_rejected_without_deadlock() {
    let m = mutex();
    let mut lock = UniqueLock::new(&m).unwrap();

    let err = lock.lock().unwrap_err();
    assert_eq!(err, SyncError::AlreadyLocked);
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(lock.owns_lock());
}

#[test]
fn test_unlock_without_ownership_is_rejected() {
    let m = mutex();
    let mut lock = UniqueLock::deferred(&m);
    assert_eq!(lock.unlock(), Err(SyncError::NotLocked));
}

#[test]
fn test_released_wrapper_is_inert() {
    let m = mutex();
    let mut lock = UniqueLock::new(&m).unwrap();

    let taken = lock.release();
    assert!(taken.is_some());
    assert_eq!(lock.lock(), Err(SyncError::NullLock));
    assert_eq!(lock.unlock(), Err(SyncError::NullLock));
    drop(lock);

    assert!(m.is_locked());
    m.unlock().unwrap();
}

#[test]
fn test_drop_unlocks_only_when_owning() {
    let m = mutex();
    {
        let mut lock = UniqueLock::new(&m).unwrap();
        lock.unlock().unwrap();
        // Someone else takes it while the wrapper is idle
        assert!(m.try_lock());
    }
    assert!(m.is_locked());
    m.unlock().unwrap();
}

#[test]
fn test_unique_lock_hands_off_between_threads() {
    let shared = Arc::new((mutex(), FutexCondvar::new(SharingMode::InProcess).unwrap()));

    let mut lock = UniqueLock::new(&shared.0).unwrap();
    let waiter = {
        let shared = shared.clone();
        thread::spawn(move || {
            let lock = UniqueLock::new(&shared.0).unwrap();
            lock.owns_lock()
        })
    };

    thread::sleep(Duration::from_millis(50));
    lock.unlock().unwrap();
    assert!(waiter.join().unwrap());
    assert!(!shared.0.is_locked());
}
