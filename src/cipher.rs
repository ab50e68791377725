//! Content protection
//!
//! Seals box content with a key derived from the box password, so storage only ever sees an
//! opaque envelope.
//!
//! - Key derivation: Argon2id over the password with a fresh 16-byte salt per seal.
//! - Encryption: AES-256-GCM with a fresh 96-bit nonce per seal.
//! - Envelope: `kbx1:` followed by base64 of `salt || nonce || ciphertext || tag`.

use aes_gcm::Aes256Gcm;
use aes_gcm::Key;
use aes_gcm::Nonce;
use aes_gcm::aead::Aead;
use aes_gcm::aead::KeyInit;
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;
use zeroize::Zeroizing;

/// Prefix marking sealed content
const ENVELOPE_PREFIX: &str = "kbx1:";

/// Salt length for the key derivation
const SALT_LEN: usize = 16;

/// Nonce length for AES-256-GCM (96 bits)
const NONCE_LEN: usize = 12;

/// Authentication tag length for AES-256-GCM
const TAG_LEN: usize = 16;

/// Key length for AES-256-GCM
const KEY_LEN: usize = 32;

/// Content protection errors
#[derive(Debug, Error)]
pub enum Error {
    /// Content does not start with the envelope prefix
    #[error("Content is not sealed")]
    NotSealed,

    /// Envelope is not valid base64
    #[error("Envelope is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// Envelope is too short to hold salt, nonce and tag
    #[error("Envelope too short: expected at least {expected} bytes, got {actual}")]
    TooShort {
        /// Minimal length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Key could not be derived from the password
    #[error("Key derivation failed: {0}")]
    KeyDerivation(argon2::Error),

    /// Encryption failed
    #[error("Encryption failed")]
    Encryption,

    /// Wrong password or tampered envelope
    #[error("Content could not be decrypted, wrong password?")]
    Decryption,

    /// Decrypted bytes are not valid UTF-8
    #[error("Decrypted content is not valid UTF-8")]
    InvalidUtf8,
}

/// Is the content a sealed envelope?
pub fn is_sealed(content: &str) -> bool {
    content.starts_with(ENVELOPE_PREFIX)
}

/// Seal plaintext content with a password
///
/// Sealing the same content twice gives two different envelopes
pub fn seal(password: &str, plaintext: &str) -> Result<String, Error> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let key = derive_key(password, &salt)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_slice()));

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|_| Error::Encryption)?;

    let mut combined = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    combined.extend_from_slice(&salt);
    combined.extend_from_slice(&nonce);
    combined.extend_from_slice(&ciphertext);

    Ok(format!("{ENVELOPE_PREFIX}{}", STANDARD.encode(combined)))
}

/// Open a sealed envelope with a password
pub fn open(password: &str, envelope: &str) -> Result<String, Error> {
    let encoded = envelope
        .strip_prefix(ENVELOPE_PREFIX)
        .ok_or(Error::NotSealed)?;

    let combined = STANDARD.decode(encoded)?;

    let min_len = SALT_LEN + NONCE_LEN + TAG_LEN;
    if combined.len() < min_len {
        return Err(Error::TooShort {
            expected: min_len,
            actual: combined.len(),
        });
    }

    let (salt, rest) = combined.split_at(SALT_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

    let key = derive_key(password, salt)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_slice()));

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| Error::Decryption)?;

    String::from_utf8(plaintext).map_err(|_| Error::InvalidUtf8)
}

/// Derive an AES-256 key from a password and salt with Argon2id
fn derive_key(password: &str, salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, Error> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);

    Argon2::default()
        .hash_password_into(password.as_bytes(), salt, &mut key[..])
        .map_err(Error::KeyDerivation)?;

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_and_open() {
        let content = "wifi: hunter2\nbank pin: 0000";

        let envelope = seal("abcd", content).unwrap();
        assert!(is_sealed(&envelope));
        assert!(!envelope.contains("hunter2"));

        assert_eq!(content, open("abcd", &envelope).unwrap());
    }

    #[test]
    fn test_seal_empty_and_unicode() {
        let envelope = seal("abcd", "").unwrap();
        assert_eq!("", open("abcd", &envelope).unwrap());

        let content = "비밀번호 🔐";
        let envelope = seal("암호암호", content).unwrap();
        assert_eq!(content, open("암호암호", &envelope).unwrap());
    }

    #[test]
    fn test_open_with_wrong_password() {
        let envelope = seal("abcd", "secret").unwrap();

        let result = open("abce", &envelope);
        assert!(matches!(result, Err(Error::Decryption)));
    }

    #[test]
    fn test_seal_is_randomized() {
        let first = seal("abcd", "secret").unwrap();
        let second = seal("abcd", "secret").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_open_plaintext() {
        assert!(!is_sealed("just some text"));
        assert!(matches!(
            open("abcd", "just some text"),
            Err(Error::NotSealed)
        ));
    }

    #[test]
    fn test_open_malformed() {
        assert!(matches!(
            open("abcd", "kbx1:not base64!"),
            Err(Error::Encoding(_))
        ));

        let short = format!("{ENVELOPE_PREFIX}{}", STANDARD.encode([0u8; 10]));
        assert!(matches!(
            open("abcd", &short),
            Err(Error::TooShort {
                expected: 44,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_open_tampered() {
        let envelope = seal("abcd", "secret").unwrap();

        let mut combined = STANDARD
            .decode(envelope.strip_prefix(ENVELOPE_PREFIX).unwrap())
            .unwrap();
        let last = combined.len() - 1;
        combined[last] ^= 0xFF;
        let tampered = format!("{ENVELOPE_PREFIX}{}", STANDARD.encode(combined));

        assert!(matches!(open("abcd", &tampered), Err(Error::Decryption)));
    }
}
