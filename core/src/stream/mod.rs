//! stream — chunked, parallel compression pipeline.
//!
//! Layering, leaf-first: chunking and framing know nothing about threads;
//! worker_pool knows nothing about codecs; pipeline wires them; core is the
//! public entry point.

pub mod chunking;
pub mod framing;
pub mod io;
pub mod parallelism;
pub mod worker_pool;
pub mod pipeline;
pub mod core;

pub use self::core::{
    PipelineConfig,
    compress_file,
    decompress_file,
    inspect_file,
    compress_bytes,
    decompress_bytes,
};
pub use parallelism::ParallelismProfile;
