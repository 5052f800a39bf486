use serde::Deserialize;

/// Public key handed out by the hosting API for sealing secrets.
///
/// `key` is base64 on the wire; `key_id` must accompany every secret
/// sealed under it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PublicKey {
    pub key_id: String,
    pub key: String,
}

/// A secret ready for upload: already sealed and base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedSecret {
    pub name: String,
    pub encrypted_value: String,
    pub key_id: String,
}
