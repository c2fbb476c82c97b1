//! Shared symmetric core: AES-256-GCM keyed by PBKDF2-expanded secrets.
//!
//! Every scheme funnels into [`derive_key_iv`] + [`seal`]/[`open`]; only
//! the origin of the secret differs (passphrase, unwrapped session secret,
//! or KEM shared secret).

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Key, Nonce};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::EnvelopeError;

/// AES-256-GCM with the 16-byte IV the key derivation produces.
type EnvelopeCipher = AesGcm<Aes256, U16>;

/// Symmetric key length in bytes.
pub const KEY_LEN: usize = 32;

/// IV length in bytes.
pub const IV_LEN: usize = 16;

/// Salt length in bytes.
pub const SALT_LEN: usize = 8;

/// AEAD tag length in bytes, appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// PBKDF2-HMAC-SHA256 iteration count. Fixed: independent decryptors must
/// use the same value to re-derive the key from an embedded salt.
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Key and IV derived for one message. Zeroized on drop.
pub(crate) struct KeyIv {
    pub key: [u8; KEY_LEN],
    pub iv: [u8; IV_LEN],
}

impl Drop for KeyIv {
    fn drop(&mut self) {
        self.key.zeroize();
        self.iv.zeroize();
    }
}

/// Expands `secret` and `salt` into the AEAD key and IV.
pub(crate) fn derive_key_iv(secret: &[u8], salt: &[u8]) -> KeyIv {
    let mut okm = [0u8; KEY_LEN + IV_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(secret, salt, PBKDF2_ROUNDS, &mut okm);

    let mut key = [0u8; KEY_LEN];
    let mut iv = [0u8; IV_LEN];
    key.copy_from_slice(&okm[..KEY_LEN]);
    iv.copy_from_slice(&okm[KEY_LEN..]);
    okm.zeroize();

    KeyIv { key, iv }
}

/// Encrypts `plaintext` under `key`/`iv`; the tag is appended.
pub(crate) fn seal(
    key: &[u8; KEY_LEN],
    iv: &[u8; IV_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, EnvelopeError> {
    let cipher = EnvelopeCipher::new(Key::<EnvelopeCipher>::from_slice(key));
    cipher
        .encrypt(Nonce::from_slice(iv), plaintext)
        .map_err(|_| EnvelopeError::Malformed("payload too large to seal".into()))
}

/// Decrypts and authenticates `ciphertext` under `key`/`iv`.
pub(crate) fn open(
    key: &[u8; KEY_LEN],
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, EnvelopeError> {
    let cipher = EnvelopeCipher::new(Key::<EnvelopeCipher>::from_slice(key));
    cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| EnvelopeError::Authentication)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(secret: &[u8], salt: &[u8]) -> KeyIv {
        derive_key_iv(secret, salt)
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = keys(b"secret", b"saltsalt");
        let b = keys(b"secret", b"saltsalt");
        assert_eq!(a.key, b.key);
        assert_eq!(a.iv, b.iv);
    }

    #[test]
    fn derivation_varies_with_salt() {
        let a = keys(b"secret", b"saltsal1");
        let b = keys(b"secret", b"saltsal2");
        assert_ne!(a.key, b.key);
    }

    #[test]
    fn derivation_varies_with_secret() {
        let a = keys(b"secret-a", b"saltsalt");
        let b = keys(b"secret-b", b"saltsalt");
        assert_ne!(a.key, b.key);
        assert_ne!(a.iv, b.iv);
    }

    #[test]
    fn seal_open_roundtrip() {
        let k = keys(b"secret", b"saltsalt");
        let ct = seal(&k.key, &k.iv, b"payload").unwrap();
        assert_eq!(ct.len(), 7 + TAG_LEN);
        let pt = open(&k.key, &k.iv, &ct).unwrap();
        assert_eq!(pt, b"payload");
    }

    #[test]
    fn empty_plaintext_roundtrip() {
        let k = keys(b"secret", b"saltsalt");
        let ct = seal(&k.key, &k.iv, b"").unwrap();
        assert_eq!(ct.len(), TAG_LEN);
        assert_eq!(open(&k.key, &k.iv, &ct).unwrap(), b"");
    }

    #[test]
    fn tampered_ciphertext_rejected() {
        let k = keys(b"secret", b"saltsalt");
        let mut ct = seal(&k.key, &k.iv, b"payload").unwrap();
        ct[0] ^= 0x01;
        assert!(matches!(
            open(&k.key, &k.iv, &ct),
            Err(EnvelopeError::Authentication)
        ));
    }

    #[test]
    fn wrong_key_rejected() {
        let k1 = keys(b"secret-1", b"saltsalt");
        let k2 = keys(b"secret-2", b"saltsalt");
        let ct = seal(&k1.key, &k1.iv, b"payload").unwrap();
        assert!(matches!(
            open(&k2.key, &k2.iv, &ct),
            Err(EnvelopeError::Authentication)
        ));
    }
}
