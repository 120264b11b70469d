//! Process-wide memory usage counters (SPEC_FULL §4.2), backing
//! `fdb_mem_used`/`fdb_mem_highwater`. All fields are atomic so allocations
//! from any thread can be recorded without a lock.

use std::sync::atomic::{AtomicI64, Ordering};

pub struct MemStatus {
    current: AtomicI64,
    high_water: AtomicI64,
    alloc_count: AtomicI64,
    current_count: AtomicI64,
    largest: AtomicI64,
}

impl MemStatus {
    pub const fn new() -> Self {
        Self {
            current: AtomicI64::new(0),
            high_water: AtomicI64::new(0),
            alloc_count: AtomicI64::new(0),
            current_count: AtomicI64::new(0),
            largest: AtomicI64::new(0),
        }
    }

    /// Record a new allocation of `size` bytes (including any allocator
    /// header, per SPEC_FULL §8 scenario 2), updating the high-water mark
    /// and largest-allocation counters as needed.
    pub fn record_alloc(&self, size: usize) {
        let size = size as i64;
        let new_current = self.current.fetch_add(size, Ordering::SeqCst) + size;
        self.alloc_count.fetch_add(1, Ordering::SeqCst);
        self.current_count.fetch_add(1, Ordering::SeqCst);

        loop {
            let high = self.high_water.load(Ordering::SeqCst);
            if new_current <= high {
                break;
            }
            if self
                .high_water
                .compare_exchange(high, new_current, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                break;
            }
        }

        loop {
            let largest = self.largest.load(Ordering::SeqCst);
            if size <= largest {
                break;
            }
            if self
                .largest
                .compare_exchange(largest, size, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                break;
            }
        }
    }

    /// Record a freed allocation of `size` bytes.
    pub fn record_free(&self, size: usize) {
        self.current.fetch_sub(size as i64, Ordering::SeqCst);
        self.current_count.fetch_sub(1, Ordering::SeqCst);
    }

    /// Bytes currently tracked as in use.
    pub fn current(&self) -> i64 {
        self.current.load(Ordering::SeqCst)
    }

    /// High-water mark of `current()`, optionally resetting it to the
    /// current value and returning the prior mark.
    pub fn highwater(&self, reset: bool) -> i64 {
        if reset {
            let current = self.current.load(Ordering::SeqCst);
            self.high_water.swap(current, Ordering::SeqCst)
        } else {
            self.high_water.load(Ordering::SeqCst)
        }
    }

    /// Total number of allocations ever recorded.
    pub fn alloc_count(&self) -> i64 {
        self.alloc_count.load(Ordering::SeqCst)
    }

    /// Number of allocations currently outstanding.
    pub fn current_count(&self) -> i64 {
        self.current_count.load(Ordering::SeqCst)
    }

    /// Largest single allocation ever recorded.
    pub fn largest(&self) -> i64 {
        self.largest.load(Ordering::SeqCst)
    }

    /// Reset every counter to zero.
    pub fn reset(&self) {
        self.current.store(0, Ordering::SeqCst);
        self.high_water.store(0, Ordering::SeqCst);
        self.alloc_count.store(0, Ordering::SeqCst);
        self.current_count.store(0, Ordering::SeqCst);
        self.largest.store(0, Ordering::SeqCst);
    }
}

impl Default for MemStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_status_is_zeroed() {
        let status = MemStatus::new();
        assert_eq!(status.current(), 0);
        assert_eq!(status.highwater(false), 0);
        assert_eq!(status.alloc_count(), 0);
        assert_eq!(status.current_count(), 0);
        assert_eq!(status.largest(), 0);
    }

    #[test]
    fn alloc_then_free_updates_current() {
        let status = MemStatus::new();

        status.record_alloc(100);
        assert_eq!(status.current(), 100);
        assert_eq!(status.alloc_count(), 1);
        assert_eq!(status.current_count(), 1);

        status.record_alloc(200);
        assert_eq!(status.current(), 300);
        assert_eq!(status.alloc_count(), 2);
        assert_eq!(status.current_count(), 2);

        status.record_free(100);
        assert_eq!(status.current(), 200);
        assert_eq!(status.alloc_count(), 2);
        assert_eq!(status.current_count(), 1);
    }

    #[test]
    fn highwater_survives_frees_until_reset() {
        let status = MemStatus::new();

        status.record_alloc(100);
        status.record_alloc(200);
        assert_eq!(status.highwater(false), 300);

        status.record_free(200);
        assert_eq!(status.highwater(false), 300);

        let old_hw = status.highwater(true);
        assert_eq!(old_hw, 300);
        assert_eq!(status.highwater(false), 100);
    }

    #[test]
    fn largest_tracks_the_biggest_single_allocation() {
        let status = MemStatus::new();

        status.record_alloc(50);
        assert_eq!(status.largest(), 50);

        status.record_alloc(100);
        assert_eq!(status.largest(), 100);

        status.record_alloc(75);
        assert_eq!(status.largest(), 100);

        status.record_free(100);
        assert_eq!(status.largest(), 100);
    }

    #[test]
    fn reset_zeroes_every_counter() {
        let status = MemStatus::new();

        status.record_alloc(100);
        status.record_alloc(200);
        status.record_free(100);
        status.reset();

        assert_eq!(status.current(), 0);
        assert_eq!(status.highwater(false), 0);
        assert_eq!(status.alloc_count(), 0);
        assert_eq!(status.current_count(), 0);
        assert_eq!(status.largest(), 0);
    }

    #[test]
    fn concurrent_alloc_and_free_stay_consistent() {
        use std::sync::Arc;
        use std::thread;

        let status = Arc::new(MemStatus::new());
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let status = Arc::clone(&status);
                thread::spawn(move || {
                    for _ in 0..100 {
                        status.record_alloc(10);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(status.alloc_count(), 1000);
        assert_eq!(status.current_count(), 1000);
        assert_eq!(status.current(), 10000);

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let status = Arc::clone(&status);
                thread::spawn(move || {
                    for _ in 0..50 {
                        status.record_free(10);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(status.current_count(), 500);
        assert_eq!(status.current(), 5000);
    }
}
