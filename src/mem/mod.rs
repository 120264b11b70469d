//! Tracked memory allocator (SPEC_FULL §4.2).
//!
//! Every allocation is prefixed with a size header so `free`/`realloc` can
//! report how much memory they are releasing. A process-global atomic
//! counter tracks bytes currently in use, counting each block's header
//! alongside its requested size (SPEC_FULL §8 scenario 2); the test suite
//! asserts it returns to zero once every handle in a test has been dropped.

pub mod alloc;
pub mod status;

pub use alloc::{MemMethods, SystemAllocator, HEADER_SIZE};
pub use status::MemStatus;

use std::sync::{Mutex, OnceLock};

static MEM_STATUS: OnceLock<MemStatus> = OnceLock::new();
static ALLOCATOR: OnceLock<Mutex<Box<dyn MemMethods>>> = OnceLock::new();

fn status() -> &'static MemStatus {
    MEM_STATUS.get_or_init(MemStatus::new)
}

fn allocator() -> &'static Mutex<Box<dyn MemMethods>> {
    ALLOCATOR.get_or_init(|| Mutex::new(Box::new(SystemAllocator::new())))
}

/// Allocate at least `size` bytes. Returns null on failure or if `size == 0`.
pub fn fdb_malloc(size: usize) -> *mut u8 {
    if size == 0 {
        return std::ptr::null_mut();
    }
    let alloc = allocator().lock().unwrap();
    let ptr = alloc.malloc(size);
    if !ptr.is_null() {
        status().record_alloc(alloc.size(ptr) + HEADER_SIZE);
    }
    ptr
}

/// Like [`fdb_malloc`] but the returned block is zero-filled.
pub fn fdb_malloc_zero(size: usize) -> *mut u8 {
    let ptr = fdb_malloc(size);
    if !ptr.is_null() {
        unsafe { std::ptr::write_bytes(ptr, 0, size) };
    }
    ptr
}

/// Free memory previously returned by [`fdb_malloc`]/[`fdb_realloc`]. A
/// no-op on a null pointer.
pub fn fdb_free(ptr: *mut u8) {
    if ptr.is_null() {
        return;
    }
    let alloc = allocator().lock().unwrap();
    let size = alloc.size(ptr);
    alloc.free(ptr);
    status().record_free(size + HEADER_SIZE);
}

/// Resize a previous allocation. `realloc(null, n)` behaves like
/// `malloc(n)`; `realloc(p, 0)` behaves like `free(p)` and returns null.
pub fn fdb_realloc(ptr: *mut u8, size: usize) -> *mut u8 {
    if ptr.is_null() {
        return fdb_malloc(size);
    }
    if size == 0 {
        fdb_free(ptr);
        return std::ptr::null_mut();
    }

    let alloc = allocator().lock().unwrap();
    let old_size = alloc.size(ptr);
    let new_ptr = alloc.realloc(ptr, size);
    if !new_ptr.is_null() {
        status().record_free(old_size + HEADER_SIZE);
        status().record_alloc(alloc.size(new_ptr) + HEADER_SIZE);
    }
    new_ptr
}

/// Like [`fdb_realloc`] but any newly grown bytes are zero-filled.
pub fn fdb_realloc_zero(ptr: *mut u8, size: usize) -> *mut u8 {
    let alloc = allocator().lock().unwrap();
    let old_size = if ptr.is_null() { 0 } else { alloc.size(ptr) };
    drop(alloc);

    let new_ptr = fdb_realloc(ptr, size);
    if !new_ptr.is_null() && size > old_size {
        unsafe {
            std::ptr::write_bytes(new_ptr.add(old_size), 0, size - old_size);
        }
    }
    new_ptr
}

/// The allocation size recorded for `ptr`, or 0 for a null pointer.
pub fn fdb_mem_size(ptr: *mut u8) -> usize {
    if ptr.is_null() {
        return 0;
    }
    allocator().lock().unwrap().size(ptr)
}

/// Bytes currently tracked as in-use by this process.
pub fn fdb_mem_used() -> i64 {
    status().current()
}

/// High-water mark of [`fdb_mem_used`], optionally resetting it to the
/// current value.
pub fn fdb_mem_highwater(reset: bool) -> i64 {
    status().highwater(reset)
}
