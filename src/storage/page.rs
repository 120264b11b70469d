//! In-memory page representation (SPEC_FULL §3), grounded on
//! `original_source/src/pager.h`'s `Page` struct.

/// Type codes stored in the page-type directory (SPEC_FULL §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PageType {
    Unused = 0,
    Header = 1,
    Vertex = 2,
    Edge = 3,
    StringPage = 4,
    Doc = 5,
    Array = 6,
    Index = 7,
    Ptype = 8,
    Cont = 9,
    Free = 10,
}

impl PageType {
    /// Decode a raw directory byte, falling back to `Unused` for any
    /// value this version of the format doesn't recognize.
    pub fn from_byte(b: u8) -> PageType {
        match b {
            0 => PageType::Unused,
            1 => PageType::Header,
            2 => PageType::Vertex,
            3 => PageType::Edge,
            4 => PageType::StringPage,
            5 => PageType::Doc,
            6 => PageType::Array,
            7 => PageType::Index,
            8 => PageType::Ptype,
            9 => PageType::Cont,
            10 => PageType::Free,
            _ => PageType::Unused,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// One resident page: `pageSize` on-disk bytes, owned by the
/// [`super::pcache::PageCache`]. Callers borrow by page number rather than
/// holding a reference across calls that may evict (SPEC_FULL §3).
#[derive(Debug, Clone)]
pub struct Page {
    pub page_no: u32,
    pub page_size: u32,
    pub usable_size: u32,
    pub page_type: PageType,
    pub dirty: bool,
    pub ref_count: u32,
    pub data: Vec<u8>,
}

impl Page {
    /// Construct a page whose `data` is exactly `page_size` zero bytes.
    pub fn zeroed(page_no: u32, page_size: u32, bytes_reserved: u8, page_type: PageType) -> Self {
        Page {
            page_no,
            page_size,
            usable_size: page_size - bytes_reserved as u32,
            page_type,
            dirty: false,
            ref_count: 0,
            data: vec![0u8; page_size as usize],
        }
    }

    /// Construct a page wrapping bytes already read off disk.
    pub fn from_bytes(
        page_no: u32,
        page_size: u32,
        bytes_reserved: u8,
        page_type: PageType,
        data: Vec<u8>,
    ) -> Self {
        debug_assert_eq!(data.len(), page_size as usize);
        Page {
            page_no,
            page_size,
            usable_size: page_size - bytes_reserved as u32,
            page_type,
            dirty: false,
            ref_count: 0,
            data,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
