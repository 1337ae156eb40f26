//! parachunk-core
//!
//! Chunked, parallel compression engine and its framed container format.
//! No CLI, no global state.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

pub mod compression;
pub mod telemetry;

// Stream layers
pub mod stream;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::compression::{ChunkCodec, CodecError, DeflateCodec};
    pub use crate::stream::{
        compress_bytes, compress_file, decompress_bytes, decompress_file, inspect_file,
        ParallelismProfile, PipelineConfig,
    };
    pub use crate::telemetry::PipelineStats;
    pub use crate::types::{PipelineError, PipelineResult};
}
