//! At-rest token encryption.
//!
//! Discord access tokens, refresh tokens, and guild bot tokens are never
//! stored in plaintext. `TokenCipher` wraps AES-256-GCM with a key derived
//! from `TOKEN_CIPHER_SECRET` via PBKDF2-HMAC-SHA256. Each encryption draws a
//! fresh 96-bit nonce; the stored payload is `base64(nonce || tag ||
//! ciphertext)` so a row is self-contained and tamper-evident.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use openssl::{
    hash::MessageDigest,
    pkcs5::pbkdf2_hmac,
    rand::rand_bytes,
    symm::{decrypt_aead, encrypt_aead, Cipher},
};

use crate::error::{auth::AuthError, Error};

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const PBKDF2_ROUNDS: usize = 100_000;
const KDF_SALT: &[u8] = b"heimdall-token-cipher-v1";

/// AEAD cipher for tokens persisted by the core.
#[derive(Clone)]
pub struct TokenCipher {
    key: [u8; KEY_LEN],
}

impl TokenCipher {
    /// Derives the cipher key from the configured secret.
    ///
    /// The same secret always derives the same key, so tokens written by a
    /// previous process generation remain readable.
    pub fn from_secret(secret: &str) -> Result<Self, Error> {
        let mut key = [0u8; KEY_LEN];
        pbkdf2_hmac(
            secret.as_bytes(),
            KDF_SALT,
            PBKDF2_ROUNDS,
            MessageDigest::sha256(),
            &mut key,
        )
        .map_err(AuthError::Crypto)?;

        Ok(Self { key })
    }

    /// Encrypts a token for storage.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, Error> {
        let mut nonce = [0u8; NONCE_LEN];
        rand_bytes(&mut nonce).map_err(AuthError::Crypto)?;

        let mut tag = [0u8; TAG_LEN];
        let ciphertext = encrypt_aead(
            Cipher::aes_256_gcm(),
            &self.key,
            Some(&nonce),
            &[],
            plaintext.as_bytes(),
            &mut tag,
        )
        .map_err(AuthError::Crypto)?;

        let mut payload = Vec::with_capacity(NONCE_LEN + TAG_LEN + ciphertext.len());
        payload.extend_from_slice(&nonce);
        payload.extend_from_slice(&tag);
        payload.extend_from_slice(&ciphertext);

        Ok(STANDARD.encode(payload))
    }

    /// Decrypts a stored token payload.
    ///
    /// # Returns
    /// - `Ok(String)` - The recovered plaintext token
    /// - `Err(Error::AuthError(AuthError::MalformedTokenPayload))` - The base64 envelope is damaged
    /// - `Err(Error::AuthError(AuthError::Crypto))` - AEAD tag mismatch (tampering or wrong secret)
    pub fn decrypt(&self, payload: &str) -> Result<String, Error> {
        let raw = STANDARD
            .decode(payload)
            .map_err(|_| AuthError::MalformedTokenPayload)?;
        if raw.len() < NONCE_LEN + TAG_LEN {
            return Err(AuthError::MalformedTokenPayload.into());
        }

        let (nonce, rest) = raw.split_at(NONCE_LEN);
        let (tag, ciphertext) = rest.split_at(TAG_LEN);

        let plaintext = decrypt_aead(
            Cipher::aes_256_gcm(),
            &self.key,
            Some(nonce),
            &[],
            ciphertext,
            tag,
        )
        .map_err(AuthError::Crypto)?;

        String::from_utf8(plaintext).map_err(|_| AuthError::MalformedTokenPayload.into())
    }
}
