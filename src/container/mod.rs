//! Reusable low-level containers (SPEC_FULL §4.6): a `u32`-keyed hash map
//! and two growable typed vectors. These are the only containers the
//! storage core depends on.

pub mod ptrmap;
pub mod u32array;
pub mod u8array;

pub use ptrmap::PtrMap;
pub use u32array::U32Array;
pub use u8array::U8Array;
