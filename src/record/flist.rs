//! FList wire format (SPEC_FULL §3), grounded on
//! `original_source/src/flist.c` / `flist.h`.
//!
//! A singly-linked list node: one inline [`Property`] plus the id of the
//! next node, or `0` to terminate the chain.

use super::property::{Property, PROPERTY_DISKSIZE};
use crate::byteorder::{read_le_u64, write_le_u64};

pub const FLIST_ENTRY_OFFSET: usize = 0;
pub const FLIST_NEXTENTRYID_OFFSET: usize = PROPERTY_DISKSIZE;
pub const FLIST_DISKSIZE: usize = PROPERTY_DISKSIZE + 8;

/// One node of an on-disk linked list of [`Property`] values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FList {
    pub id: u64,
    pub entry: Property,
    pub next_entry_id: u64,
}

impl FList {
    /// Load an `FList` node from the 17 bytes at the start of `source`;
    /// `id` is supplied externally.
    pub fn load(id: u64, source: &[u8]) -> Self {
        let entry = Property::load(&source[FLIST_ENTRY_OFFSET..]);
        let next_entry_id = read_le_u64(&source[FLIST_NEXTENTRYID_OFFSET..]);
        FList {
            id,
            entry,
            next_entry_id,
        }
    }

    /// Serialize this node to the 17 bytes at the start of `dest`.
    pub fn unload(&self, dest: &mut [u8]) {
        self.entry.unload(&mut dest[FLIST_ENTRY_OFFSET..]);
        write_le_u64(&mut dest[FLIST_NEXTENTRYID_OFFSET..], self.next_entry_id);
    }

    /// True iff this node is the last in its chain.
    pub fn is_terminal(&self) -> bool {
        self.next_entry_id == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let node = FList {
            id: 1,
            entry: Property::integer(9),
            next_entry_id: 2,
        };
        let mut buf = [0u8; FLIST_DISKSIZE];
        node.unload(&mut buf);
        let reloaded = FList::load(1, &buf);
        assert_eq!(reloaded.entry.to_i64(), 9);
        assert_eq!(reloaded.next_entry_id, 2);
        assert!(!reloaded.is_terminal());
    }

    #[test]
    fn terminal_node_has_zero_next() {
        let node = FList {
            id: 1,
            entry: Property::void(),
            next_entry_id: 0,
        };
        assert!(node.is_terminal());
    }
}
