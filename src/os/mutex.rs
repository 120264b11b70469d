//! Recursive mutex table (SPEC_FULL §4.3), grounded on
//! `original_source/src/mutex.c` / `mutex.h`.
//!
//! FabricDB needs exactly one process-wide mutex, guarding the shared
//! `InodeInfo` table in `os::unix`. It is reentrant: the owning thread may
//! call `enter` any number of times so long as it calls `leave` an equal
//! number of times.

use std::sync::{Condvar, Mutex, OnceLock};
use std::thread::ThreadId;

/// The sole mutex id this crate uses, guarding per-inode lock-sharing state.
pub const INODE_MUTEX: usize = 0;

const MUTEX_COUNT: usize = 1;

struct MutexState {
    owner: Option<ThreadId>,
    ref_count: u32,
}

struct FdbMutex {
    state: Mutex<MutexState>,
    condvar: Condvar,
}

impl FdbMutex {
    fn new() -> Self {
        FdbMutex {
            state: Mutex::new(MutexState {
                owner: None,
                ref_count: 0,
            }),
            condvar: Condvar::new(),
        }
    }

    fn enter(&self) {
        let tid = std::thread::current().id();
        let mut guard = self.state.lock().unwrap();
        loop {
            match guard.owner {
                Some(owner) if owner == tid => {
                    guard.ref_count += 1;
                    return;
                }
                None => {
                    guard.owner = Some(tid);
                    guard.ref_count = 1;
                    return;
                }
                Some(_) => {
                    guard = self.condvar.wait(guard).unwrap();
                }
            }
        }
    }

    fn leave(&self) {
        let tid = std::thread::current().id();
        let mut guard = self.state.lock().unwrap();
        assert!(guard.owner == Some(tid) && guard.ref_count > 0);
        guard.ref_count -= 1;
        if guard.ref_count == 0 {
            guard.owner = None;
            self.condvar.notify_one();
        }
    }

    fn held_by_current(&self) -> bool {
        self.state.lock().unwrap().owner == Some(std::thread::current().id())
    }
}

static MUTEXES: OnceLock<[FdbMutex; MUTEX_COUNT]> = OnceLock::new();

fn table() -> &'static [FdbMutex; MUTEX_COUNT] {
    MUTEXES.get_or_init(|| [FdbMutex::new()])
}

/// Enter the mutex named by `mutex_id`, blocking until it is available.
/// Safe to call repeatedly from the same thread; each call must be matched
/// by a [`leave_mutex`].
pub fn enter_mutex(mutex_id: usize) {
    table()[mutex_id].enter();
}

/// Leave the mutex named by `mutex_id`. The current thread must hold it.
pub fn leave_mutex(mutex_id: usize) {
    table()[mutex_id].leave();
}

/// True iff the current thread holds the mutex named by `mutex_id`.
pub fn mutex_held(mutex_id: usize) -> bool {
    table()[mutex_id].held_by_current()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::thread;

    #[test]
    fn reentrant_enter_from_same_thread() {
        enter_mutex(INODE_MUTEX);
        enter_mutex(INODE_MUTEX);
        assert!(mutex_held(INODE_MUTEX));
        leave_mutex(INODE_MUTEX);
        assert!(mutex_held(INODE_MUTEX));
        leave_mutex(INODE_MUTEX);
    }

    #[test]
    fn excludes_other_threads() {
        enter_mutex(INODE_MUTEX);
        let counter = Arc::new(AtomicU32::new(0));
        let c2 = counter.clone();
        let handle = thread::spawn(move || {
            enter_mutex(INODE_MUTEX);
            c2.fetch_add(1, Ordering::SeqCst);
            leave_mutex(INODE_MUTEX);
        });
        thread::sleep(std::time::Duration::from_millis(20));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        leave_mutex(INODE_MUTEX);
        handle.join().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
