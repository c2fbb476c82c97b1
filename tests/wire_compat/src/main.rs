fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use sealstream_envelope::{
        ENCAPPED_MAGIC, IV_LEN, KEY_LEN, MAGIC_LEN, PBKDF2_ROUNDS, SALT_LEN, SALTED_MAGIC,
        TAG_LEN, WRAPPED_MAGIC, kem, passphrase, wrap,
    };

    /// Reads the `(marker, key_block, payload)` split of a blob the way a
    /// foreign decryptor would: trust the length prefix, assume nothing
    /// about the key-block width.
    fn foreign_read(blob: &[u8]) -> (&[u8], &[u8], &[u8]) {
        let marker = &blob[..MAGIC_LEN];
        let len = u32::from_be_bytes(blob[MAGIC_LEN..MAGIC_LEN + 4].try_into().unwrap()) as usize;
        let key_block = &blob[MAGIC_LEN + 4..MAGIC_LEN + 4 + len];
        let payload = &blob[MAGIC_LEN + 4 + len..];
        (marker, key_block, payload)
    }

    // --- Salted blob layout ---

    #[test]
    fn salted_blob_field_offsets() {
        let blob = passphrase::encrypt(b"hello world", b"p@ss").unwrap();

        // [0..8) marker, [8..16) salt, [16..) ciphertext || tag.
        assert_eq!(&blob[..MAGIC_LEN], SALTED_MAGIC);
        assert_eq!(
            blob.len(),
            MAGIC_LEN + SALT_LEN + b"hello world".len() + TAG_LEN
        );
    }

    #[test]
    fn salted_marker_is_literal_ascii() {
        assert_eq!(SALTED_MAGIC, b"Salted__");
        assert_eq!(MAGIC_LEN, 8);
        assert_eq!(SALT_LEN, 8);
    }

    #[test]
    fn symmetric_parameters_are_pinned() {
        // Interop constants: any independent implementation must match.
        assert_eq!(KEY_LEN, 32);
        assert_eq!(IV_LEN, 16);
        assert_eq!(TAG_LEN, 16);
        assert_eq!(PBKDF2_ROUNDS, 100_000);
    }

    // --- Wrap scheme layout ---

    #[test]
    fn wrapped_file_blob_layout() {
        let (private, public) = wrap::generate_keypair(1024).unwrap();
        let blob = wrap::encrypt_file(b"payload", &public).unwrap();

        let (marker, key_block, payload) = foreign_read(&blob);
        assert_eq!(marker, WRAPPED_MAGIC);
        // 1024-bit RSA yields a 128-byte OAEP block; the reader learns that
        // from the prefix, not from a constant.
        assert_eq!(key_block.len(), 128);
        assert_eq!(&payload[..MAGIC_LEN], SALTED_MAGIC);

        assert_eq!(wrap::decrypt_file(&blob, &private).unwrap(), b"payload");
    }

    #[test]
    fn wrapped_text_and_file_framings_carry_the_same_fields() {
        let (private, public) = wrap::generate_keypair(1024).unwrap();
        let text = wrap::encrypt_text(b"cross-framing", &public).unwrap();

        // Reassemble the file framing from the text framing's parts; the
        // file decryptor must accept it.
        let (wrapped_b64, payload_b64) = text.split_once('.').unwrap();
        let wrapped = BASE64.decode(wrapped_b64).unwrap();
        let payload = BASE64.decode(payload_b64).unwrap();

        let mut blob = Vec::new();
        blob.extend_from_slice(WRAPPED_MAGIC);
        blob.extend_from_slice(&(wrapped.len() as u32).to_be_bytes());
        blob.extend_from_slice(&wrapped);
        blob.extend_from_slice(&payload);

        assert_eq!(
            wrap::decrypt_file(&blob, &private).unwrap(),
            b"cross-framing"
        );
    }

    // --- KEM scheme layout ---

    #[test]
    fn encapped_file_blob_layout() {
        let (private, public) = kem::generate_keypair();
        let blob = kem::encrypt_file(b"payload", &public).unwrap();

        let (marker, key_block, payload) = foreign_read(&blob);
        assert_eq!(marker, ENCAPPED_MAGIC);
        // ML-KEM-768 ciphertext is 1088 bytes today; the prefix is what a
        // reader must trust if the parameter set ever changes.
        assert_eq!(key_block.len(), 1088);
        assert_eq!(&payload[..MAGIC_LEN], SALTED_MAGIC);

        assert_eq!(kem::decrypt_file(&blob, &private).unwrap(), b"payload");
    }

    #[test]
    fn encapped_text_and_file_framings_carry_the_same_fields() {
        let (private, public) = kem::generate_keypair();
        let text = kem::encrypt_text(b"cross-framing", &public).unwrap();

        let (ct_b64, payload_b64) = text.split_once('.').unwrap();
        let kem_ct = BASE64.decode(ct_b64).unwrap();
        let payload = BASE64.decode(payload_b64).unwrap();

        let mut blob = Vec::new();
        blob.extend_from_slice(ENCAPPED_MAGIC);
        blob.extend_from_slice(&(kem_ct.len() as u32).to_be_bytes());
        blob.extend_from_slice(&kem_ct);
        blob.extend_from_slice(&payload);

        assert_eq!(
            kem::decrypt_file(&blob, &private).unwrap(),
            b"cross-framing"
        );
    }

    // --- Cross-scheme invariants ---

    #[test]
    fn markers_are_distinct() {
        assert_ne!(SALTED_MAGIC, WRAPPED_MAGIC);
        assert_ne!(SALTED_MAGIC, ENCAPPED_MAGIC);
        assert_ne!(WRAPPED_MAGIC, ENCAPPED_MAGIC);
    }

    #[test]
    fn key_establishment_payload_is_a_plain_salted_blob() {
        // One symmetric core, three key-establishment front ends: a salted
        // blob built under an arbitrary 32-byte secret has the exact shape
        // the wrap/KEM payload field carries.
        let secret = [0x42u8; 32];
        let inner = passphrase::encrypt(b"inner", &secret).unwrap();
        assert_eq!(&inner[..MAGIC_LEN], SALTED_MAGIC);
        assert_eq!(passphrase::decrypt(&inner, &secret).unwrap(), b"inner");
    }
}
