use rand::{CryptoRng, RngCore};

use super::{
    crypto_box::CryptoBox,
    error::IesError,
    message::{CipherObject, Content},
};
use crate::ecdh::{PublicKey, SecretKey};

// SEALING KEY
// ================================================================================================

/// Public key for sealing messages to a recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SealingKey(PublicKey);

impl SealingKey {
    pub fn new(public_key: PublicKey) -> Self {
        Self(public_key)
    }

    /// Parses a hex encoded SEC1 point, compressed or uncompressed.
    pub fn from_hex(hex: &str) -> Result<Self, IesError> {
        Ok(Self(PublicKey::from_hex(hex)?))
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.0
    }

    /// Seal (encrypt and authenticate) content for this recipient using the thread-local random
    /// number generator.
    #[cfg(feature = "std")]
    pub fn seal(&self, content: &Content) -> Result<CipherObject, IesError> {
        let mut rng = rand::rng();
        self.seal_with_rng(&mut rng, content)
    }

    /// Seal (encrypt and authenticate) content for this recipient
    pub fn seal_with_rng<R: CryptoRng + RngCore>(
        &self,
        rng: &mut R,
        content: &Content,
    ) -> Result<CipherObject, IesError> {
        let raw = CryptoBox::seal(rng, &self.0, content.as_bytes())?;
        Ok(CipherObject::from_raw(&raw, content.is_text()))
    }
}

impl From<PublicKey> for SealingKey {
    fn from(public_key: PublicKey) -> Self {
        Self(public_key)
    }
}

// UNSEALING KEY
// ================================================================================================

/// Secret key for unsealing messages
#[derive(Debug, Clone)]
pub struct UnsealingKey(SecretKey);

impl UnsealingKey {
    pub fn new(secret_key: SecretKey) -> Self {
        Self(secret_key)
    }

    /// Parses a hex encoded secret scalar; see [`SecretKey::from_hex`].
    pub fn from_hex(hex: &str) -> Result<Self, IesError> {
        Ok(Self(SecretKey::from_hex(hex)?))
    }

    /// Returns the sealing key matching this unsealing key.
    pub fn sealing_key(&self) -> SealingKey {
        SealingKey(self.0.public_key())
    }

    /// Unseal a sealed message
    pub fn unseal(&self, cipher_object: &CipherObject) -> Result<Content, IesError> {
        let raw = cipher_object.to_raw().inspect_err(|err| {
            tracing::debug!("rejected envelope: {err}");
        })?;

        let plaintext = CryptoBox::unseal(&self.0, &raw)?;
        Content::from_plaintext(plaintext, cipher_object.was_string)
    }
}

impl From<SecretKey> for UnsealingKey {
    fn from(secret_key: SecretKey) -> Self {
        Self(secret_key)
    }
}
