//! Container framing.
//!
//! Responsibilities:
//! - Define the container magic and record header
//! - Write records in strict index order
//! - Read records back with strict validation
//!
//! Non-responsibilities:
//! - Compression
//! - Parallelism

pub mod types;
pub mod encode;
pub mod decode;

pub use types::{
    FrameError,
    RecordHeader,
    RecordInfo,
    ContainerSummary,
    MAGIC_LEN,
};
pub use encode::FrameWriter;
pub use decode::{FrameReader, inspect_container};
