use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use crypto_box::aead::OsRng;

use crate::core::errors::{EnvsyncError, Result};
use crate::core::models::public_key::PublicKey;
use crate::core::traits::sealer::SecretSealer;

/// Anonymous sealed boxes (X25519 + XSalsa20-Poly1305).
///
/// Wire-compatible with libsodium's `crypto_box_seal`, which is what the
/// GitHub Actions secrets API expects. Each seal uses a fresh ephemeral
/// keypair, so the output differs on every call and the sender cannot
/// open it.
pub struct SealedBoxSealer;

impl SealedBoxSealer {
    /// Decode a base64 recipient key into an X25519 public key.
    fn recipient_key(recipient: &PublicKey) -> Result<crypto_box::PublicKey> {
        let bytes = STANDARD
            .decode(recipient.key.trim())
            .map_err(|e| EnvsyncError::Seal {
                reason: format!("public key '{}' is not valid base64: {e}", recipient.key_id),
            })?;

        let raw: [u8; crypto_box::KEY_SIZE] =
            bytes.as_slice().try_into().map_err(|_| EnvsyncError::Seal {
                reason: format!(
                    "public key '{}' is {} bytes, expected {}",
                    recipient.key_id,
                    bytes.len(),
                    crypto_box::KEY_SIZE
                ),
            })?;

        Ok(crypto_box::PublicKey::from(raw))
    }
}

impl SecretSealer for SealedBoxSealer {
    fn seal(&self, plaintext: &str, recipient: &PublicKey) -> Result<String> {
        let key = Self::recipient_key(recipient)?;
        let sealed = key
            .seal(&mut OsRng, plaintext.as_bytes())
            .map_err(|e| EnvsyncError::Seal {
                reason: format!("{e}"),
            })?;
        Ok(STANDARD.encode(sealed))
    }
}
