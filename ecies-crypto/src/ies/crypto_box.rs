//! Core cryptographic primitive for the Integrated Encryption Scheme (IES).
//!
//! [`CryptoBox`] combines secp256k1 ECDH with a SHA-512 key split, AES-256-CBC and
//! HMAC-SHA256 (encrypt-then-MAC). [`RawSealedMessage`] carries the resulting fields in raw form.

use alloc::vec::Vec;

use rand::{CryptoRng, RngCore};

use super::error::IesError;
use crate::{
    aes_cbc::{CipherError, InitializationVector},
    ecdh::{EphemeralPublicKey, EphemeralSecretKey, PublicKey, SecretKey, SharedSecret},
    kdf::DerivedKeys,
};

/// The fixed secp256k1 + AES-256-CBC + HMAC-SHA256 construction.
pub(crate) struct CryptoBox;

/// Internal raw sealed message representation
#[derive(Debug, Clone)]
pub(crate) struct RawSealedMessage {
    pub iv: InitializationVector,
    pub ephemeral_public_key: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub mac: Vec<u8>,
}

impl CryptoBox {
    /// Encrypts `plaintext` to `recipient_public_key`.
    ///
    /// The ephemeral secret key is drawn from `rng` before the IV.
    pub fn seal<R: CryptoRng + RngCore>(
        rng: &mut R,
        recipient_public_key: &PublicKey,
        plaintext: &[u8],
    ) -> Result<RawSealedMessage, IesError> {
        let ephemeral_private = EphemeralSecretKey::with_rng(rng);
        let ephemeral_public = ephemeral_private.ephemeral_public_key();

        let shared_secret = ephemeral_private.diffie_hellman(*recipient_public_key);
        let keys = derive_keys(&shared_secret)?;

        let iv = InitializationVector::with_rng(rng);
        let ciphertext = keys.cipher_key().encrypt(&iv, plaintext);

        let ephemeral_public_key = ephemeral_public.to_bytes();
        let mac = keys.authenticate([
            iv.as_bytes().as_slice(),
            ephemeral_public_key.as_slice(),
            ciphertext.as_slice(),
        ]);

        tracing::trace!(
            plaintext_len = plaintext.len(),
            ciphertext_len = ciphertext.len(),
            "sealed message"
        );

        Ok(RawSealedMessage {
            iv,
            ephemeral_public_key: ephemeral_public_key.to_vec(),
            ciphertext,
            mac: mac.as_bytes().to_vec(),
        })
    }

    /// Authenticates and decrypts `sealed_message` with the recipient's secret key.
    ///
    /// The MAC is checked before the ciphertext is decrypted; an ephemeral key which is not a
    /// curve point counts as an authentication failure.
    pub fn unseal(
        recipient_private_key: &SecretKey,
        sealed_message: &RawSealedMessage,
    ) -> Result<Vec<u8>, IesError> {
        let ephemeral_public = EphemeralPublicKey::from_bytes(&sealed_message.ephemeral_public_key)
            .map_err(|_| {
                tracing::debug!("ephemeral public key is not a secp256k1 point");
                IesError::Authentication
            })?;

        let shared_secret = recipient_private_key.get_shared_secret(ephemeral_public);
        let keys = derive_keys(&shared_secret)?;

        // the tag covers the re-encoded key, so an uncompressed encoding is accepted as well
        let ephemeral_public_key = ephemeral_public.to_bytes();
        let expected_mac = keys.authenticate([
            sealed_message.iv.as_bytes().as_slice(),
            ephemeral_public_key.as_slice(),
            sealed_message.ciphertext.as_slice(),
        ]);

        if !expected_mac.verify(&sealed_message.mac) {
            tracing::debug!(mac_len = sealed_message.mac.len(), "mac check failed");
            return Err(IesError::Authentication);
        }

        tracing::trace!(ciphertext_len = sealed_message.ciphertext.len(), "mac check passed");

        keys.cipher_key()
            .decrypt(&sealed_message.iv, &sealed_message.ciphertext)
            .map_err(|err: CipherError| {
                tracing::warn!("authenticated ciphertext failed to decrypt: {err}");
                IesError::Padding
            })
    }
}

// HELPERS
// ================================================================================================

fn derive_keys(shared_secret: &SharedSecret) -> Result<DerivedKeys, IesError> {
    let secret = shared_secret.to_canonical_bytes()?;
    Ok(DerivedKeys::from_shared_secret(secret.as_slice()))
}
