//! compression/mod.rs
//! Per-chunk codec adapter.
//!
//! Notes:
//! - Every chunk is encoded as its own independent stream, so chunks can be
//!   processed in any order and on any thread.
//! - Codecs are stateless; one instance is shared by reference across workers.

pub mod types;
pub mod codecs;

pub use types::*;
pub use codecs::*;
