//! Wrap scheme: fresh session secret under RSA-OAEP.
//!
//! Each message generates a random 32-byte session secret, encrypts the
//! payload with the salted symmetric core under that secret, and wraps the
//! secret itself under the recipient's public key with OAEP-SHA-256.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::RngCore;
use rand::rngs::OsRng;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::framing::{self, WRAPPED_MAGIC};
use crate::{EnvelopeError, passphrase};

/// Session secret length in bytes.
const SECRET_LEN: usize = 32;

/// Generates a recipient keypair. 2048 bits is the usual choice.
pub fn generate_keypair(bits: usize) -> Result<(RsaPrivateKey, RsaPublicKey), EnvelopeError> {
    let private = RsaPrivateKey::new(&mut OsRng, bits)?;
    let public = RsaPublicKey::from(&private);
    Ok((private, public))
}

fn wrap_secret(recipient: &RsaPublicKey, secret: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
    Ok(recipient.encrypt(&mut OsRng, Oaep::new::<Sha256>(), secret)?)
}

fn unwrap_secret(recipient: &RsaPrivateKey, wrapped: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
    Ok(recipient.decrypt(Oaep::new::<Sha256>(), wrapped)?)
}

fn encrypt_parts(
    plaintext: &[u8],
    recipient: &RsaPublicKey,
) -> Result<(Vec<u8>, Vec<u8>), EnvelopeError> {
    let mut secret = [0u8; SECRET_LEN];
    OsRng.fill_bytes(&mut secret);

    let wrapped = wrap_secret(recipient, &secret)?;
    let payload = passphrase::encrypt(plaintext, &secret);
    secret.zeroize();

    Ok((wrapped, payload?))
}

/// Encrypts to the dot-separated text framing:
/// `base64(wrapped secret) + "." + base64(salted blob)`.
pub fn encrypt_text(plaintext: &[u8], recipient: &RsaPublicKey) -> Result<String, EnvelopeError> {
    let (wrapped, payload) = encrypt_parts(plaintext, recipient)?;
    Ok(format!(
        "{}.{}",
        BASE64.encode(wrapped),
        BASE64.encode(payload)
    ))
}

/// Decrypts the output of [`encrypt_text`].
pub fn decrypt_text(text: &str, recipient: &RsaPrivateKey) -> Result<Vec<u8>, EnvelopeError> {
    let (wrapped_b64, payload_b64) = text
        .split_once('.')
        .ok_or_else(|| EnvelopeError::Malformed("missing '.' separator".into()))?;
    let wrapped = BASE64.decode(wrapped_b64)?;
    let payload = BASE64.decode(payload_b64)?;

    let mut secret = unwrap_secret(recipient, &wrapped)?;
    let plaintext = passphrase::decrypt(&payload, &secret);
    secret.zeroize();
    plaintext
}

/// Encrypts to the binary file framing: `Wrapped_` marker, length-prefixed
/// wrapped secret, salted blob.
pub fn encrypt_file(plaintext: &[u8], recipient: &RsaPublicKey) -> Result<Vec<u8>, EnvelopeError> {
    let (wrapped, payload) = encrypt_parts(plaintext, recipient)?;
    framing::write_key_block(WRAPPED_MAGIC, &wrapped, &payload)
}

/// Decrypts the output of [`encrypt_file`].
pub fn decrypt_file(blob: &[u8], recipient: &RsaPrivateKey) -> Result<Vec<u8>, EnvelopeError> {
    let (wrapped, payload) = framing::read_key_block(WRAPPED_MAGIC, blob)?;

    let mut secret = unwrap_secret(recipient, wrapped)?;
    let plaintext = passphrase::decrypt(payload, &secret);
    secret.zeroize();
    plaintext
}
