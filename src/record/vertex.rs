//! Vertex wire format (SPEC_FULL §3), grounded on
//! `original_source/src/vertex.c` / `vertex.h`.
//!
//! Note: the source's `fdb_vertex_load` reads `symbolId` with a 16-bit
//! `letohu16`, inconsistent with both the struct's `uint32_t` declaration
//! and the sibling `edge.c`, which reads its equivalent field as a full
//! `u32`. Treated as an unintentional bug and not reproduced here (see
//! DESIGN.md); `symbol_id` is read and written as a full `u32`.

use super::property::{Property, PROPERTY_DISKSIZE};
use crate::byteorder::{read_le_u32, write_le_u32};

pub const VERTEX_SYMBOLID_OFFSET: usize = 0;
pub const VERTEX_VALUE_OFFSET: usize = 4;
pub const VERTEX_FIRSTOUTEDGEID_OFFSET: usize = VERTEX_VALUE_OFFSET + PROPERTY_DISKSIZE;
pub const VERTEX_FIRSTINEDGEID_OFFSET: usize = VERTEX_FIRSTOUTEDGEID_OFFSET + 4;
pub const VERTEX_DISKSIZE: usize = VERTEX_FIRSTINEDGEID_OFFSET + 4;

/// A graph vertex record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub id: u64,
    pub symbol_id: u32,
    pub value: Property,
    pub first_out_edge_id: u32,
    pub first_in_edge_id: u32,
}

impl Vertex {
    /// Load a `Vertex` from the 21 bytes at the start of `source`; `id` is
    /// supplied externally.
    pub fn load(id: u64, source: &[u8]) -> Self {
        Vertex {
            id,
            symbol_id: read_le_u32(&source[VERTEX_SYMBOLID_OFFSET..]),
            value: Property::load(&source[VERTEX_VALUE_OFFSET..]),
            first_out_edge_id: read_le_u32(&source[VERTEX_FIRSTOUTEDGEID_OFFSET..]),
            first_in_edge_id: read_le_u32(&source[VERTEX_FIRSTINEDGEID_OFFSET..]),
        }
    }

    /// Serialize this `Vertex` to the 21 bytes at the start of `dest`.
    pub fn unload(&self, dest: &mut [u8]) {
        write_le_u32(&mut dest[VERTEX_SYMBOLID_OFFSET..], self.symbol_id);
        self.value.unload(&mut dest[VERTEX_VALUE_OFFSET..]);
        write_le_u32(
            &mut dest[VERTEX_FIRSTOUTEDGEID_OFFSET..],
            self.first_out_edge_id,
        );
        write_le_u32(
            &mut dest[VERTEX_FIRSTINEDGEID_OFFSET..],
            self.first_in_edge_id,
        );
    }

    /// True iff this vertex has no outgoing edges.
    pub fn has_no_out_edges(&self) -> bool {
        self.first_out_edge_id == 0
    }

    /// True iff this vertex has no incoming edges.
    pub fn has_no_in_edges(&self) -> bool {
        self.first_in_edge_id == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let v = Vertex {
            id: 1,
            symbol_id: 0x0001_0203,
            value: Property::integer(-1),
            first_out_edge_id: 4,
            first_in_edge_id: 5,
        };
        let mut buf = [0u8; VERTEX_DISKSIZE];
        v.unload(&mut buf);
        let reloaded = Vertex::load(1, &buf);
        assert_eq!(reloaded.symbol_id, 0x0001_0203);
        assert_eq!(reloaded.value.to_i64(), -1);
        assert_eq!(reloaded.first_out_edge_id, 4);
        assert_eq!(reloaded.first_in_edge_id, 5);
    }

    #[test]
    fn symbol_id_survives_full_32_bits() {
        let v = Vertex {
            id: 1,
            symbol_id: 0xFFFF_FFFF,
            value: Property::void(),
            first_out_edge_id: 0,
            first_in_edge_id: 0,
        };
        let mut buf = [0u8; VERTEX_DISKSIZE];
        v.unload(&mut buf);
        assert_eq!(Vertex::load(1, &buf).symbol_id, 0xFFFF_FFFF);
    }
}
