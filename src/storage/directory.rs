//! Page-type directory (SPEC_FULL §4.8), grounded on
//! `original_source/src/pager.h`'s `PageTypeCache` struct and the loading
//! rules sketched in `pager.c`'s header-format comment.
//!
//! The directory lives at offset 100 of page 1: one type byte per page
//! number, continuing onto further pages when a `PTYPE` byte is reached,
//! terminated by the first `UNUSED` byte.

use crate::container::{U32Array, U8Array};
use crate::storage::page::PageType;

/// Number of distinct [`PageType`] variants, sizing the per-type index.
const TYPE_COUNT: usize = 11;

/// In-memory view of the page-number-to-type directory.
pub struct PageTypeCache {
    /// Every page's type code, indexed by page number (index 0 is
    /// padding, matching the on-disk layout).
    all_pages: U8Array,
    /// For each [`PageType`] discriminant, the page numbers of that type.
    pages_by_type: [U32Array; TYPE_COUNT],
    dirty: bool,
}

impl PageTypeCache {
    pub fn new() -> Self {
        PageTypeCache {
            all_pages: U8Array::new(),
            pages_by_type: Default::default(),
            dirty: false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// The type recorded for `page_no`, or `Unused` if never recorded.
    pub fn type_of(&self, page_no: u32) -> PageType {
        PageType::from_byte(self.all_pages.get_or(page_no as usize, 0))
    }

    /// Every page number currently recorded as `page_type`, in the order
    /// they were set.
    pub fn pages_of_type(&self, page_type: PageType) -> impl Iterator<Item = u32> + '_ {
        self.pages_by_type[page_type.as_byte() as usize].iter().copied()
    }

    /// Record that `page_no` is of `page_type`. Page numbers must be set
    /// in increasing order starting at 1, matching how the directory is
    /// built while loading or while allocating new pages.
    pub fn set_type(&mut self, page_no: u32, page_type: PageType) {
        if !self.all_pages.has(0) {
            let _ = self.all_pages.set(0, 0);
        }
        let _ = self.all_pages.set(page_no as usize, page_type.as_byte());
        self.pages_by_type[page_type.as_byte() as usize].push(page_no);
        self.dirty = true;
    }

    fn set_type_no_mark(&mut self, page_no: u32, page_type: PageType) {
        let _ = self.all_pages.set(page_no as usize, page_type.as_byte());
        self.pages_by_type[page_type.as_byte() as usize].push(page_no);
    }

    /// Load the directory from the raw bytes of the header page, starting
    /// at byte offset 100, given a function that fetches the raw bytes of
    /// a continuation page by number (1-based count of continuation
    /// pages seen so far, not the page's own page number). Reading stops
    /// at the first `UNUSED` byte; a `PTYPE` byte means "continue on the
    /// next physical page at offset 0".
    pub fn load(&mut self, header_page_data: &[u8], mut next_page: impl FnMut(u32) -> Vec<u8>) {
        self.all_pages.clear();
        for list in &mut self.pages_by_type {
            list.clear();
        }
        let _ = self.all_pages.set(0, 0);

        let mut page_no: u32 = 1;
        let mut continuation_no: u32 = 0;
        let mut current: Vec<u8> = header_page_data[100..].to_vec();
        let mut idx = 0;

        loop {
            if idx >= current.len() {
                self.dirty = false;
                return;
            }
            let byte = current[idx];
            idx += 1;
            match PageType::from_byte(byte) {
                PageType::Unused => {
                    self.dirty = false;
                    return;
                }
                PageType::Ptype => {
                    continuation_no += 1;
                    current = next_page(continuation_no);
                    idx = 0;
                }
                other => {
                    self.set_type_no_mark(page_no, other);
                    page_no += 1;
                }
            }
        }
    }

    /// Serialize the directory bytes (not including the leading index-0
    /// pad) for writing back starting at offset 100 of page 1, onward
    /// through continuation pages as needed. Returns one `Vec<u8>` per
    /// physical page the directory occupies, in order.
    pub fn serialize(
        &self,
        first_page_capacity: usize,
        continuation_capacity: usize,
    ) -> Vec<Vec<u8>> {
        let mut out = vec![Vec::new()];
        let mut capacity = first_page_capacity;
        let mut page_idx = 0;

        for page_no in 1..self.all_pages.count() as u32 {
            if out[page_idx].len() == capacity.saturating_sub(1) {
                out[page_idx].push(PageType::Ptype.as_byte());
                out.push(Vec::new());
                page_idx += 1;
                capacity = continuation_capacity;
            }
            out[page_idx].push(self.all_pages.get_or(page_no as usize, 0));
        }
        out[page_idx].push(PageType::Unused.as_byte());
        out
    }
}

impl Default for PageTypeCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_type_records_both_indexes() {
        let mut dir = PageTypeCache::new();
        dir.set_type(1, PageType::Header);
        dir.set_type(2, PageType::Vertex);
        assert_eq!(dir.type_of(1), PageType::Header);
        assert_eq!(dir.type_of(2), PageType::Vertex);
        assert_eq!(dir.pages_of_type(PageType::Vertex).collect::<Vec<_>>(), vec![2]);
        assert!(dir.is_dirty());
    }

    #[test]
    fn unset_page_reads_as_unused() {
        let dir = PageTypeCache::new();
        assert_eq!(dir.type_of(5), PageType::Unused);
    }

    #[test]
    fn load_stops_at_unused() {
        let mut header = vec![0u8; 100];
        header.push(PageType::Header.as_byte());
        header.push(PageType::Unused.as_byte());
        header.resize(100 + 50, 0);

        let mut dir = PageTypeCache::new();
        dir.load(&header, |_| Vec::new());
        assert_eq!(dir.type_of(1), PageType::Header);
        assert_eq!(dir.type_of(2), PageType::Unused);
        assert!(!dir.is_dirty());
    }

    #[test]
    fn load_follows_continuation_page() {
        let mut header = vec![0u8; 100];
        header.push(PageType::Header.as_byte());
        header.push(PageType::Ptype.as_byte());

        let mut cont = vec![PageType::Vertex.as_byte(), PageType::Unused.as_byte()];
        cont.resize(1024, 0);

        let mut dir = PageTypeCache::new();
        dir.load(&header, move |n| {
            assert_eq!(n, 1);
            cont.clone()
        });
        assert_eq!(dir.type_of(1), PageType::Header);
        assert_eq!(dir.type_of(2), PageType::Vertex);
        assert_eq!(dir.type_of(3), PageType::Unused);
    }
}
