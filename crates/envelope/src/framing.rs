//! Envelope byte framings.
//!
//! # Wire format
//!
//! ```text
//! SALTED BLOB (passphrase scheme; also the payload of the other two):
//!   [8 bytes: b"Salted__"]
//!   [8 bytes: salt]
//!   [N bytes: AES-256-GCM ciphertext || 16-byte tag]
//!
//! KEY-ESTABLISHMENT BLOB (wrap and KEM schemes):
//!   [8 bytes: b"Wrapped_" or b"Encapped"]
//!   [4 bytes BE: key_block_len]
//!   [key_block_len bytes: RSA-OAEP wrapped secret / ML-KEM ciphertext]
//!   [M bytes: salted blob as above, keyed by the established secret]
//! ```
//!
//! The length prefix is authoritative. Readers must not assume a fixed
//! key-block width: the block changes size with the RSA modulus or the KEM
//! parameter set.

use crate::EnvelopeError;

/// Length of every scheme marker, in bytes.
pub const MAGIC_LEN: usize = 8;

/// Marker opening a salted passphrase blob.
pub const SALTED_MAGIC: &[u8; MAGIC_LEN] = b"Salted__";

/// Marker opening a wrapped-key (RSA-OAEP) blob.
pub const WRAPPED_MAGIC: &[u8; MAGIC_LEN] = b"Wrapped_";

/// Marker opening an encapsulated-key (ML-KEM) blob.
pub const ENCAPPED_MAGIC: &[u8; MAGIC_LEN] = b"Encapped";

/// Assembles a key-establishment blob.
pub(crate) fn write_key_block(
    magic: &[u8; MAGIC_LEN],
    key_block: &[u8],
    payload: &[u8],
) -> Result<Vec<u8>, EnvelopeError> {
    let Ok(len) = u32::try_from(key_block.len()) else {
        return Err(EnvelopeError::Malformed(format!(
            "key block too large: {} bytes",
            key_block.len()
        )));
    };

    let mut out = Vec::with_capacity(MAGIC_LEN + 4 + key_block.len() + payload.len());
    out.extend_from_slice(magic);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(key_block);
    out.extend_from_slice(payload);
    Ok(out)
}

/// Splits a key-establishment blob into `(key_block, payload)`.
pub(crate) fn read_key_block<'a>(
    magic: &[u8; MAGIC_LEN],
    blob: &'a [u8],
) -> Result<(&'a [u8], &'a [u8]), EnvelopeError> {
    if blob.len() < MAGIC_LEN + 4 {
        return Err(EnvelopeError::Malformed("envelope too short".into()));
    }
    if &blob[..MAGIC_LEN] != magic {
        return Err(EnvelopeError::Malformed(format!(
            "bad envelope marker, expected {:?}",
            String::from_utf8_lossy(magic)
        )));
    }

    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&blob[MAGIC_LEN..MAGIC_LEN + 4]);
    let len = u32::from_be_bytes(len_bytes) as usize;

    let rest = &blob[MAGIC_LEN + 4..];
    if rest.len() < len {
        return Err(EnvelopeError::Malformed(format!(
            "key block truncated: expected {len} bytes, have {}",
            rest.len()
        )));
    }
    Ok((&rest[..len], &rest[len..]))
}
