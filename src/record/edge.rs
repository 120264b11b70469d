//! Edge wire format (SPEC_FULL §3), grounded on
//! `original_source/src/edge.c` / `edge.h`.

use super::property::{Property, PROPERTY_DISKSIZE};
use crate::byteorder::{read_le_u32, write_le_u32};

pub const EDGE_SYMBOLID_OFFSET: usize = 0;
pub const EDGE_VALUE_OFFSET: usize = 4;
pub const EDGE_FROMID_OFFSET: usize = EDGE_VALUE_OFFSET + PROPERTY_DISKSIZE;
pub const EDGE_TOID_OFFSET: usize = EDGE_FROMID_OFFSET + 4;
pub const EDGE_FROMNEXTEDGEID_OFFSET: usize = EDGE_TOID_OFFSET + 4;
pub const EDGE_TONEXTEDGEID_OFFSET: usize = EDGE_FROMNEXTEDGEID_OFFSET + 4;
pub const EDGE_DISKSIZE: usize = EDGE_TONEXTEDGEID_OFFSET + 4;

/// A graph edge record, doubly intrusive-linked into both its endpoints'
/// adjacency chains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub id: u64,
    pub symbol_id: u32,
    pub value: Property,
    pub from_vertex_id: u32,
    pub to_vertex_id: u32,
    pub from_next_edge_id: u32,
    pub to_next_edge_id: u32,
}

impl Edge {
    /// Load an `Edge` from the 29 bytes at the start of `source`; `id` is
    /// supplied externally.
    pub fn load(id: u64, source: &[u8]) -> Self {
        Edge {
            id,
            symbol_id: read_le_u32(&source[EDGE_SYMBOLID_OFFSET..]),
            value: Property::load(&source[EDGE_VALUE_OFFSET..]),
            from_vertex_id: read_le_u32(&source[EDGE_FROMID_OFFSET..]),
            to_vertex_id: read_le_u32(&source[EDGE_TOID_OFFSET..]),
            from_next_edge_id: read_le_u32(&source[EDGE_FROMNEXTEDGEID_OFFSET..]),
            to_next_edge_id: read_le_u32(&source[EDGE_TONEXTEDGEID_OFFSET..]),
        }
    }

    /// Serialize this `Edge` to the 29 bytes at the start of `dest`.
    pub fn unload(&self, dest: &mut [u8]) {
        write_le_u32(&mut dest[EDGE_SYMBOLID_OFFSET..], self.symbol_id);
        self.value.unload(&mut dest[EDGE_VALUE_OFFSET..]);
        write_le_u32(&mut dest[EDGE_FROMID_OFFSET..], self.from_vertex_id);
        write_le_u32(&mut dest[EDGE_TOID_OFFSET..], self.to_vertex_id);
        write_le_u32(
            &mut dest[EDGE_FROMNEXTEDGEID_OFFSET..],
            self.from_next_edge_id,
        );
        write_le_u32(&mut dest[EDGE_TONEXTEDGEID_OFFSET..], self.to_next_edge_id);
    }

    /// True iff this edge is the last in its source vertex's out-chain.
    pub fn is_last_out_edge(&self) -> bool {
        self.from_next_edge_id == 0
    }

    /// True iff this edge is the last in its destination vertex's in-chain.
    pub fn is_last_in_edge(&self) -> bool {
        self.to_next_edge_id == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let e = Edge {
            id: 1,
            symbol_id: 7,
            value: Property::boolean(true),
            from_vertex_id: 2,
            to_vertex_id: 3,
            from_next_edge_id: 0,
            to_next_edge_id: 9,
        };
        let mut buf = [0u8; EDGE_DISKSIZE];
        e.unload(&mut buf);
        let reloaded = Edge::load(1, &buf);
        assert_eq!(reloaded.from_vertex_id, 2);
        assert_eq!(reloaded.to_vertex_id, 3);
        assert!(reloaded.is_last_out_edge());
        assert!(!reloaded.is_last_in_edge());
        assert!(reloaded.value.to_bool());
    }
}
