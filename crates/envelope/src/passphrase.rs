//! Passphrase scheme: salted blob with PBKDF2-derived key and IV.
//!
//! The `secret` parameter is any byte string — a human passphrase for the
//! standalone scheme, or an established session secret when called from the
//! wrap/KEM schemes.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::framing::{MAGIC_LEN, SALTED_MAGIC};
use crate::seal::{self, SALT_LEN};
use crate::EnvelopeError;

/// Encrypts `plaintext` under `secret` with a fresh random salt.
pub fn encrypt(plaintext: &[u8], secret: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let keys = seal::derive_key_iv(secret, &salt);
    let ciphertext = seal::seal(&keys.key, &keys.iv, plaintext)?;

    let mut out = Vec::with_capacity(MAGIC_LEN + SALT_LEN + ciphertext.len());
    out.extend_from_slice(SALTED_MAGIC);
    out.extend_from_slice(&salt);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypts a salted blob, re-deriving the key from the embedded salt.
pub fn decrypt(blob: &[u8], secret: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
    if blob.len() < MAGIC_LEN + SALT_LEN {
        return Err(EnvelopeError::Malformed("salted blob too short".into()));
    }
    if &blob[..MAGIC_LEN] != SALTED_MAGIC {
        return Err(EnvelopeError::Malformed("missing salted marker".into()));
    }

    let salt = &blob[MAGIC_LEN..MAGIC_LEN + SALT_LEN];
    let keys = seal::derive_key_iv(secret, salt);
    seal::open(&keys.key, &keys.iv, &blob[MAGIC_LEN + SALT_LEN..])
}

/// [`encrypt`], base64-encoded for text contexts.
pub fn encrypt_to_base64(plaintext: &[u8], secret: &[u8]) -> Result<String, EnvelopeError> {
    Ok(BASE64.encode(encrypt(plaintext, secret)?))
}

/// Decrypts the output of [`encrypt_to_base64`].
pub fn decrypt_from_base64(text: &str, secret: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
    let blob = BASE64.decode(text.trim())?;
    decrypt(&blob, secret)
}
