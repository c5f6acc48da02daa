//! Elliptic Curve Integrated Encryption Scheme (ECIES) over secp256k1.
//!
//! A message is sealed to a recipient's public key as follows:
//!
//! 1. a fresh ephemeral key pair is generated and ECDH with the recipient key gives a shared
//!    secret, taken as exactly 32 big-endian bytes;
//! 2. SHA-512 of the shared secret is split into a 32-byte AES key and a 32-byte HMAC key;
//! 3. the content is encrypted with AES-256-CBC (PKCS#7 padding) under a random 16-byte IV;
//! 4. HMAC-SHA256 is computed over `iv || ephemeral_pk || cipher_text`, where `ephemeral_pk` is
//!    the compressed SEC1 point.
//!
//! The result is a [`CipherObject`] holding every field as hex. Decryption recomputes the MAC and
//! compares it in constant time before any ciphertext is decrypted.
//!
//! ```
//! use ecies_crypto::ies::{Content, UnsealingKey, decrypt, encrypt};
//! use ecies_crypto::ecdh::SecretKey;
//!
//! let secret_key = SecretKey::new();
//! let public_key_hex = secret_key.public_key().to_hex();
//!
//! let envelope = encrypt(&public_key_hex, "hello world".into()).unwrap();
//! assert!(envelope.was_string);
//!
//! let content = decrypt(&secret_key.to_hex(), &envelope).unwrap();
//! assert_eq!(content, Content::Text("hello world".into()));
//!
//! // the typed keys give the same result
//! let unsealing_key = UnsealingKey::from(secret_key);
//! assert_eq!(unsealing_key.unseal(&envelope).unwrap(), content);
//! ```

use rand::{CryptoRng, RngCore};

mod crypto_box;
mod error;
mod keys;
mod message;

pub use error::IesError;
pub use keys::{SealingKey, UnsealingKey};
pub use message::{CipherObject, Content};

#[cfg(test)]
mod tests;

// ENTRY POINTS
// ================================================================================================

/// Encrypts `content` to the secp256k1 public key given as hex, using the thread-local random
/// number generator.
#[cfg(feature = "std")]
pub fn encrypt(public_key_hex: &str, content: Content) -> Result<CipherObject, IesError> {
    let mut rng = rand::rng();
    encrypt_with_rng(&mut rng, public_key_hex, content)
}

/// Encrypts `content` to the secp256k1 public key given as hex.
///
/// The public key is parsed before any randomness is drawn; a malformed key yields
/// [`IesError::InvalidKey`].
pub fn encrypt_with_rng<R: CryptoRng + RngCore>(
    rng: &mut R,
    public_key_hex: &str,
    content: Content,
) -> Result<CipherObject, IesError> {
    SealingKey::from_hex(public_key_hex)?.seal_with_rng(rng, &content)
}

/// Decrypts `cipher_object` with the secp256k1 secret key given as hex.
///
/// Returns [`Content::Text`] if the envelope was created from text and [`Content::Bytes`]
/// otherwise.
///
/// # Errors
/// - [`IesError::InvalidKey`] if the secret key is malformed or out of range.
/// - [`IesError::MalformedEnvelope`] if a field is not hex or the IV is not 16 bytes.
/// - [`IesError::Authentication`] if the MAC does not match.
/// - [`IesError::Padding`] if authenticated ciphertext cannot be unpadded.
/// - [`IesError::InvalidUtf8`] if text was sealed but the plaintext is not UTF-8.
pub fn decrypt(private_key_hex: &str, cipher_object: &CipherObject) -> Result<Content, IesError> {
    UnsealingKey::from_hex(private_key_hex)?.unseal(cipher_object)
}
