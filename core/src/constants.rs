/// Magic tag opening every container.
/// "CMP1" = chunked compressed payload, layout 1
pub const MAGIC_CMP1: [u8; 4] = *b"CMP1";

/// Defaults when the caller does not choose
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024; // 16 KiB
/// Max chunk size sanity bound (32 MiB).
pub const MAX_CHUNK_SIZE: usize = 32 * 1024 * 1024;

/// Default zlib level (balanced).
pub const DEFAULT_LEVEL_DEFLATE: u32 = 6;
pub const MAX_LEVEL_DEFLATE: u32 = 9;

/// In-flight chunks allowed per worker before the dispatcher waits.
pub const INFLIGHT_PER_WORKER: usize = 4;

/// Hard caps on pool size. Each worker is an OS thread and each in-flight
/// slot may hold a full chunk.
pub const MAX_WORKERS: usize = 256;
pub const MAX_INFLIGHT: usize = MAX_WORKERS * INFLIGHT_PER_WORKER;

/// Upper bound on the zlib output for `len` input bytes (zlib `compressBound`).
#[inline]
pub const fn compress_bound(len: usize) -> usize {
    len + (len >> 12) + (len >> 14) + (len >> 25) + 13
}
