//! Hybrid envelope encryption for transfer payloads.
//!
//! Three interoperable schemes share one AES-256-GCM core and differ only
//! in how the symmetric secret is established:
//!
//! - [`passphrase`] — the secret is the caller's passphrase; key and IV are
//!   derived per message with PBKDF2 and a fresh salt.
//! - [`wrap`] — a fresh random session secret, wrapped under the
//!   recipient's RSA public key with OAEP.
//! - [`kem`] — an ML-KEM-768 shared secret established by encapsulation.
//!
//! The wrap and KEM schemes carry their key material in a length-prefixed
//! block followed by the same salted payload blob the passphrase scheme
//! produces; see [`framing`] for the exact byte layouts.

pub mod framing;
pub mod kem;
pub mod passphrase;
mod seal;
pub mod wrap;

pub use framing::{ENCAPPED_MAGIC, MAGIC_LEN, SALTED_MAGIC, WRAPPED_MAGIC};
pub use seal::{IV_LEN, KEY_LEN, PBKDF2_ROUNDS, SALT_LEN, TAG_LEN};

/// Errors produced by the envelope crate.
///
/// All of these are fatal: retrying cannot repair corrupted or mismatched
/// input, so the transfer layer never retries them.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("malformed envelope: {0}")]
    Malformed(String),

    #[error("authentication failed")]
    Authentication,

    #[error("key wrap error: {0}")]
    Wrap(#[from] rsa::Error),

    #[error("key encapsulation error: {0}")]
    Kem(String),

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),
}
