//! Payload-size driven sizing rules.

/// Minimum part size accepted by the remote multipart protocol.
///
/// Only the final part may be smaller.
pub const MIN_PART_SIZE: u64 = 5 * MIB;

/// Maximum number of parts the remote finalize call accepts.
pub const MAX_PARTS: u64 = 10_000;

const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * MIB;

/// Returns the encryption-framing chunk size for a payload of `total` bytes.
///
/// Tiers: over 1 GiB → 20 MiB, over 100 MiB → 64 MiB, over 10 MiB → 16 MiB,
/// otherwise the whole payload as a single chunk. Note the top tier is
/// smaller than the middle tier, so chunk size is not monotonic in payload
/// size.
pub fn chunk_size_for(total: u64) -> u64 {
    if total > GIB {
        20 * MIB
    } else if total > 100 * MIB {
        64 * MIB
    } else if total > 10 * MIB {
        16 * MIB
    } else {
        total
    }
}

/// Returns the upload part size for a payload of `total` bytes.
///
/// Parts are cut at the protocol minimum and grow only when `total` would
/// otherwise overflow the [`MAX_PARTS`] cap of the finalize call.
pub fn part_size_for(total: u64, min_part_size: u64) -> u64 {
    let floor = min_part_size.max(1);
    floor.max(total.div_ceil(MAX_PARTS))
}
