use crc32fast::Hasher;

/// CRC32 (IEEE) over a raw chunk.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
