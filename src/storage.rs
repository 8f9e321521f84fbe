//! Backing store implementations for sessions

mod interface;
pub use interface::*;

pub mod memory;

#[cfg(feature = "mongodb")]
pub mod mongo;
