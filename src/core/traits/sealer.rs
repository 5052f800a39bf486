use crate::core::errors::Result;
use crate::core::models::public_key::PublicKey;

/// Port for the anonymous public-key encryption applied to secrets.
///
/// Implementations live in `adapters::cipher`. The sealing side keeps
/// no key material that could open its own output.
pub trait SecretSealer: Send + Sync {
    /// Seal `plaintext` for the holder of `recipient`'s private key and
    /// return the ciphertext base64-encoded for transport.
    fn seal(&self, plaintext: &str, recipient: &PublicKey) -> Result<String>;
}
