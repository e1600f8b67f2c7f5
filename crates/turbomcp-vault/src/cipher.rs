//! AES-256-GCM encryption with a 16-byte nonce, keyed by a scrypt-derived
//! key, and the `ivHex:authTagHex:ciphertextHex` wire encoding.

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::generic_array::typenum::U16;
use aes_gcm::aes::Aes256;
use aes_gcm::{AeadInPlace, AesGcm, KeyInit};
use rand::RngCore;
use scrypt::Params;

use turbomcp_core::{Error, Result};

/// AES-256-GCM configured with a 16-byte nonce, matching this store's
/// on-disk encoding rather than AEAD's usual 12-byte default.
type Cipher = AesGcm<Aes256, U16>;

const NONCE_LEN: usize = 16;
const TAG_LEN: usize = 16;
const SCRYPT_SALT: &[u8] = b"turbomcp-vault-scrypt-salt-v1";

/// Derive a 32-byte AES-256 key from `passphrase` via scrypt.
///
/// Uses a fixed, implementation-internal salt: the store's security model
/// relies on the passphrase itself being secret, not on a per-install salt.
fn derive_key(passphrase: &str) -> [u8; 32] {
    let params = Params::new(15, 8, 1, 32).expect("fixed scrypt params are valid");
    let mut key = [0u8; 32];
    scrypt::scrypt(passphrase.as_bytes(), SCRYPT_SALT, &params, &mut key)
        .expect("scrypt output length matches the requested key size");
    key
}

/// Encrypt `plaintext` under `passphrase`, returning the
/// `ivHex:authTagHex:ciphertextHex` encoding.
pub fn encrypt(passphrase: &str, plaintext: &[u8]) -> String {
    let key = derive_key(passphrase);
    let cipher = Cipher::new(GenericArray::from_slice(&key));

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce_bytes);
    let nonce = GenericArray::from_slice(&nonce_bytes);

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(nonce, &[], &mut buffer)
        .expect("encryption with a validly sized key and nonce cannot fail");

    format!(
        "{}:{}:{}",
        hex::encode(nonce_bytes),
        hex::encode(tag),
        hex::encode(buffer)
    )
}

/// Decrypt an `ivHex:authTagHex:ciphertextHex` encoding produced by
/// [`encrypt`].
///
/// # Errors
///
/// Returns [`Error::invalid_encrypted_format`] if the encoding doesn't have
/// exactly three colon-separated hex parts with the expected IV/tag
/// lengths, or [`Error::decryption_failed`] if the authentication tag
/// doesn't verify.
pub fn decrypt(passphrase: &str, encoded: &str) -> Result<Vec<u8>> {
    let parts: Vec<&str> = encoded.split(':').collect();
    let [iv_hex, tag_hex, ciphertext_hex] = parts[..] else {
        return Err(Error::invalid_encrypted_format("Invalid encrypted data format"));
    };

    let nonce_bytes =
        hex::decode(iv_hex).map_err(|_| Error::invalid_encrypted_format("Invalid encrypted data format"))?;
    let tag_bytes = hex::decode(tag_hex)
        .map_err(|_| Error::invalid_encrypted_format("Invalid encrypted data format"))?;
    let mut buffer = hex::decode(ciphertext_hex)
        .map_err(|_| Error::invalid_encrypted_format("Invalid encrypted data format"))?;

    if nonce_bytes.len() != NONCE_LEN || tag_bytes.len() != TAG_LEN {
        return Err(Error::invalid_encrypted_format("Invalid encrypted data format"));
    }

    let key = derive_key(passphrase);
    let cipher = Cipher::new(GenericArray::from_slice(&key));
    let nonce = GenericArray::from_slice(&nonce_bytes);
    let tag = GenericArray::from_slice(&tag_bytes);

    cipher
        .decrypt_in_place_detached(nonce, &[], &mut buffer, tag)
        .map_err(|_| Error::decryption_failed("Decryption failed"))?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_plaintext() {
        let encoded = encrypt("correct horse battery staple", b"hello vault");
        let decrypted = decrypt("correct horse battery staple", &encoded).unwrap();
        assert_eq!(decrypted, b"hello vault");
    }

    #[test]
    fn encoding_has_three_colon_separated_hex_parts() {
        let encoded = encrypt("pass", b"data");
        let parts: Vec<&str> = encoded.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), NONCE_LEN * 2);
        assert_eq!(parts[1].len(), TAG_LEN * 2);
    }

    #[test]
    fn successive_encryptions_use_distinct_ivs() {
        let first = encrypt("pass", b"data");
        let second = encrypt("pass", b"data");
        let first_iv = first.split(':').next().unwrap();
        let second_iv = second.split(':').next().unwrap();
        assert_ne!(first_iv, second_iv);
    }

    #[test]
    fn wrong_passphrase_fails_decryption() {
        let encoded = encrypt("right-passphrase", b"secret");
        let err = decrypt("wrong-passphrase", &encoded).unwrap_err();
        assert!(err.to_string().contains("Decryption failed"));
    }

    #[test]
    fn malformed_encoding_is_rejected() {
        let err = decrypt("pass", "not-three-parts").unwrap_err();
        assert!(err.to_string().contains("Invalid encrypted data format"));
    }

    #[test]
    fn tampered_ciphertext_fails_tag_check() {
        let mut encoded = encrypt("pass", b"data");
        let last_char = encoded.pop().unwrap();
        encoded.push(if last_char == '0' { '1' } else { '0' });
        let err = decrypt("pass", &encoded).unwrap_err();
        assert!(err.to_string().contains("Decryption failed"));
    }
}
