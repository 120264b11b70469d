//! OS abstraction layer: per-inode lock sharing and the Unix file backend.

pub mod mutex;

#[cfg(unix)]
pub mod inode;

#[cfg(unix)]
pub mod unix;
