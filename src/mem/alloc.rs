//! Pluggable allocator backend (SPEC_FULL §4.2), grounded on
//! `original_source/src/fabric.h`'s `sqlite3_mem_methods`-style allocator
//! vtable, trimmed to the operations the tracked allocator actually calls.
//!
//! [`SystemAllocator`] is the only implementation: a thin wrapper over
//! Rust's global allocator that prefixes every block with a `usize` header
//! so `free`/`realloc` can recover the original requested size without the
//! caller having to pass it back in.

#![allow(clippy::not_unsafe_ptr_arg_deref)]

use std::alloc::{GlobalAlloc, Layout, System};

/// Size, in bytes, of the header every [`SystemAllocator`] block carries
/// ahead of the pointer it hands back to the caller.
pub const HEADER_SIZE: usize = std::mem::size_of::<usize>();

/// A swappable backing allocator. All methods must be thread-safe.
pub trait MemMethods: Send + Sync {
    /// Allocate at least `size` bytes, 8-byte aligned. Null on failure.
    fn malloc(&self, size: usize) -> *mut u8;

    /// Free memory previously returned by `malloc`/`realloc`. No-op on null.
    fn free(&self, ptr: *mut u8);

    /// Resize a previous allocation. Null on failure leaves `ptr` untouched.
    fn realloc(&self, ptr: *mut u8, new_size: usize) -> *mut u8;

    /// The requested size of the block at `ptr`, or 0 for a null pointer.
    fn size(&self, ptr: *mut u8) -> usize;
}

/// Wraps Rust's global allocator, size-prefixed so every block's original
/// request size can be recovered for `size`/`free`/`realloc`.
pub struct SystemAllocator {
    alignment: usize,
}

impl SystemAllocator {
    pub fn new() -> Self {
        Self { alignment: 8 }
    }

    fn layout(&self, size: usize) -> Layout {
        Layout::from_size_align(HEADER_SIZE + size, self.alignment).unwrap()
    }

    unsafe fn user_ptr(&self, base: *mut u8) -> *mut u8 {
        base.add(HEADER_SIZE)
    }

    unsafe fn base_ptr(&self, user: *mut u8) -> *mut u8 {
        user.sub(HEADER_SIZE)
    }
}

impl Default for SystemAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl MemMethods for SystemAllocator {
    fn malloc(&self, size: usize) -> *mut u8 {
        if size == 0 {
            return std::ptr::null_mut();
        }

        let layout = self.layout(size);
        unsafe {
            let base = System.alloc(layout);
            if base.is_null() {
                return std::ptr::null_mut();
            }
            *(base as *mut usize) = size;
            self.user_ptr(base)
        }
    }

    fn free(&self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }
        unsafe {
            let base = self.base_ptr(ptr);
            let size = *(base as *const usize);
            System.dealloc(base, self.layout(size));
        }
    }

    fn realloc(&self, ptr: *mut u8, new_size: usize) -> *mut u8 {
        if ptr.is_null() {
            return self.malloc(new_size);
        }
        if new_size == 0 {
            self.free(ptr);
            return std::ptr::null_mut();
        }

        unsafe {
            let base = self.base_ptr(ptr);
            let old_size = *(base as *const usize);
            let old_layout = self.layout(old_size);
            let new_layout = self.layout(new_size);

            let new_base = System.realloc(base, old_layout, new_layout.size());
            if new_base.is_null() {
                return std::ptr::null_mut();
            }
            *(new_base as *mut usize) = new_size;
            self.user_ptr(new_base)
        }
    }

    fn size(&self, ptr: *mut u8) -> usize {
        if ptr.is_null() {
            return 0;
        }
        unsafe {
            let base = self.base_ptr(ptr);
            *(base as *const usize)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malloc_then_free_round_trips() {
        let alloc = SystemAllocator::new();
        let ptr = alloc.malloc(100);
        assert!(!ptr.is_null());
        unsafe {
            std::ptr::write_bytes(ptr, 0x55, 100);
        }
        assert_eq!(alloc.size(ptr), 100);
        alloc.free(ptr);
    }

    #[test]
    fn malloc_zero_returns_null() {
        let alloc = SystemAllocator::new();
        assert!(alloc.malloc(0).is_null());
    }

    #[test]
    fn realloc_grow_and_shrink_preserve_contents() {
        let alloc = SystemAllocator::new();

        let ptr = alloc.malloc(100);
        unsafe {
            std::ptr::write_bytes(ptr, 0xAA, 100);
        }

        let ptr = alloc.realloc(ptr, 200);
        assert!(!ptr.is_null());
        assert_eq!(alloc.size(ptr), 200);
        unsafe {
            let slice = std::slice::from_raw_parts(ptr, 100);
            assert!(slice.iter().all(|&b| b == 0xAA));
        }

        let ptr = alloc.realloc(ptr, 50);
        assert!(!ptr.is_null());
        assert_eq!(alloc.size(ptr), 50);
        unsafe {
            let slice = std::slice::from_raw_parts(ptr, 50);
            assert!(slice.iter().all(|&b| b == 0xAA));
        }

        alloc.free(ptr);
    }

    #[test]
    fn realloc_null_behaves_like_malloc() {
        let alloc = SystemAllocator::new();
        let ptr = alloc.realloc(std::ptr::null_mut(), 100);
        assert!(!ptr.is_null());
        assert_eq!(alloc.size(ptr), 100);
        alloc.free(ptr);
    }

    #[test]
    fn realloc_zero_frees() {
        let alloc = SystemAllocator::new();
        let ptr = alloc.malloc(100);
        assert!(alloc.realloc(ptr, 0).is_null());
    }

    #[test]
    fn free_null_is_noop() {
        let alloc = SystemAllocator::new();
        alloc.free(std::ptr::null_mut());
    }

    #[test]
    fn size_of_null_is_zero() {
        let alloc = SystemAllocator::new();
        assert_eq!(alloc.size(std::ptr::null_mut()), 0);
    }

    #[test]
    fn blocks_stay_eight_byte_aligned() {
        let alloc = SystemAllocator::new();
        for _ in 0..100 {
            let ptr = alloc.malloc(17);
            assert!(!ptr.is_null());
            assert_eq!((ptr as usize) % 8, 0);
            alloc.free(ptr);
        }
    }

    #[test]
    fn large_allocation_round_trips() {
        let alloc = SystemAllocator::new();
        let ptr = alloc.malloc(1024 * 1024);
        assert!(!ptr.is_null());
        unsafe {
            std::ptr::write_bytes(ptr, 0x42, 1024 * 1024);
        }
        alloc.free(ptr);
    }
}
