//! FabricDB storage substrate: file format, pager, page cache, page-type
//! directory, and advisory file-locking state machine.

// Several pragma getters/setters and OS-layer methods have no caller yet
// within this crate but are part of its public surface.
#![allow(dead_code)]

pub mod byteorder;
pub mod container;
pub mod error;
pub mod mem;
pub mod os;
pub mod record;
pub mod storage;

// Re-export main public types
pub use error::{ErrorCode, FdbError, Result};

// Re-export memory allocation functions
pub use mem::{
    fdb_free, fdb_malloc, fdb_malloc_zero, fdb_mem_highwater, fdb_mem_size, fdb_mem_used,
    fdb_realloc, fdb_realloc_zero,
};

pub use record::{Document, Edge, FList, FString, LabeledProperty, Property, Symbol, Vertex};

pub use storage::{Page, PageType, PageTypeCache, Pager};
