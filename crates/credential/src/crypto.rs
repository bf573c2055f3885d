//! Symmetric authenticated encryption for stored secrets, and the PKCE /
//! state-token randomness used by the OAuth2 flow.
//!
//! Key derivation is deterministic: the same deployment secret always
//! yields the same [`EncryptionKey`], so encrypted rows remain readable
//! across process restarts without persisting the key itself. Key
//! rotation is out of scope; rotating the deployment secret invalidates
//! every stored credential.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::Argon2;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::CredentialError;

/// Fixed application-level salt for the deployment-secret KDF. Not a
/// per-record salt: its only job is to domain-separate this KDF use from
/// any other argon2 use in the process, not to add per-row randomness
/// (the nonce does that at the AEAD layer).
const KDF_SALT: &[u8] = b"nebula-credential/v1/deployment-secret-kdf";

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// A 256-bit symmetric key, derived once at process startup from the
/// deployment's `credential_encryption_secret` and held as a process-wide
/// singleton for the process lifetime.
#[derive(Clone)]
pub struct EncryptionKey([u8; 32]);

impl EncryptionKey {
    /// Derive the key from the deployment secret via Argon2id with a fixed
    /// salt: same secret in, same key out, every time.
    pub fn derive(deployment_secret: &str) -> Result<Self, CredentialError> {
        let mut out = [0u8; 32];
        Argon2::default()
            .hash_password_into(deployment_secret.as_bytes(), KDF_SALT, &mut out)
            .map_err(|e| CredentialError::Crypto(format!("key derivation failed: {e}")))?;
        Ok(Self(out))
    }

    /// Wrap an already-derived 32-byte key directly (tests, or a secret
    /// manager that hands back raw key material instead of a passphrase).
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive a field-scoped subkey via `HMAC-SHA256(self, label)`, so
    /// encrypting the access token and the refresh token under the same
    /// [`EncryptionKey`] still produces ciphertexts with no shared key
    /// material: recovering one does not help recover the other.
    fn subkey(&self, label: &[u8]) -> [u8; 32] {
        let mut mac =
            Hmac::<Sha256>::new_from_slice(&self.0).expect("HMAC accepts any key length");
        mac.update(label);
        let result = mac.finalize().into_bytes();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        out
    }
}

impl Drop for EncryptionKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Ciphertext plus the AEAD nonce and authentication tag needed to
/// decrypt it. Stored as separate fields (rather than one concatenated
/// blob) so storage providers can enforce payload-size limits on the
/// ciphertext alone.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EncryptedData {
    /// Per-encryption random nonce.
    pub nonce: [u8; NONCE_LEN],
    /// The encrypted payload.
    pub ciphertext: Vec<u8>,
    /// AEAD authentication tag (AES-GCM appends this to the ciphertext on
    /// encrypt; it is split out here purely for size-accounting).
    pub tag: [u8; TAG_LEN],
}

/// Encrypt `plaintext` under `key`, scoped to `field_label` (e.g.
/// `b"access_token"` vs `b"refresh_token"`) so the two fields of one
/// credential never share key material.
pub fn encrypt(
    key: &EncryptionKey,
    field_label: &[u8],
    plaintext: &[u8],
) -> Result<EncryptedData, CredentialError> {
    let subkey = key.subkey(field_label);
    let cipher = Aes256Gcm::new_from_slice(&subkey)
        .map_err(|e| CredentialError::Crypto(format!("bad key length: {e}")))?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let combined = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad: field_label,
            },
        )
        .map_err(|e| CredentialError::Crypto(format!("encryption failed: {e}")))?;

    let split_at = combined.len().saturating_sub(TAG_LEN);
    let (ciphertext, tag_slice) = combined.split_at(split_at);
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(tag_slice);

    Ok(EncryptedData {
        nonce: nonce_bytes,
        ciphertext: ciphertext.to_vec(),
        tag,
    })
}

/// Decrypt `data` under `key`, verifying it was encrypted with the same
/// `field_label` used at encryption time.
pub fn decrypt(
    key: &EncryptionKey,
    field_label: &[u8],
    data: &EncryptedData,
) -> Result<Vec<u8>, CredentialError> {
    let subkey = key.subkey(field_label);
    let cipher = Aes256Gcm::new_from_slice(&subkey)
        .map_err(|e| CredentialError::Crypto(format!("bad key length: {e}")))?;
    let nonce = Nonce::from_slice(&data.nonce);

    let mut combined = Vec::with_capacity(data.ciphertext.len() + TAG_LEN);
    combined.extend_from_slice(&data.ciphertext);
    combined.extend_from_slice(&data.tag);

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: &combined,
                aad: field_label,
            },
        )
        .map_err(|_| CredentialError::Crypto("decryption failed (tampered or wrong key)".into()))
}

/// Generate a PKCE code verifier: a random, URL-safe string of 43-128
/// characters (RFC 7636 s4.1). We always emit the maximum-entropy 128
/// characters mapped to the unreserved alphabet.
#[must_use]
pub fn generate_pkce_verifier() -> String {
    const ALPHABET: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";
    let mut rng = rand::thread_rng();
    (0..128)
        .map(|_| {
            let idx = (rng.next_u32() as usize) % ALPHABET.len();
            ALPHABET[idx] as char
        })
        .collect()
}

/// Derive the PKCE `S256` code challenge for a verifier: `base64url(sha256(verifier))`,
/// no padding (RFC 7636 §4.2).
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use sha2::Digest;

    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Generate an opaque random token with at least 128 bits of entropy,
/// base64url-encoded. Used for OAuth2 CSRF state tokens.
#[must_use]
pub fn generate_random_state() -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    let mut bytes = [0u8; 18]; // 144 bits
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
