//! ECDH (Elliptic Curve Diffie-Hellman) key agreement over the secp256k1 curve.
//!
//! Note that the intended use is a one-way, sender initiated key agreement. The sender knows the
//! (static) public key of the receiver and uses it, together with an ephemeral secret key that it
//! generates, to derive a shared secret. The shared secret is then turned into symmetric keys for
//! encrypting and authenticating a single message, and the public key associated with the
//! ephemeral secret key is sent alongside the encrypted message.

use alloc::string::String;
use core::fmt;

use k256::{
    EncodedPoint, FieldBytes,
    elliptic_curve::sec1::{Tag, ToEncodedPoint},
};
use rand::{CryptoRng, RngCore};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::utils::{
    HexParseError, OversizedScalarError, SCALAR_BYTES, canonical_scalar_bytes, hex_to_vec,
    strip_hex_prefix,
};

// CONSTANTS
// ================================================================================================

/// Size of a serialized secret key in bytes.
pub const SECRET_KEY_BYTES: usize = SCALAR_BYTES;

/// Size of a serialized public key in bytes; we use the compressed format.
pub const PUBLIC_KEY_BYTES: usize = 33;

// ERRORS
// ================================================================================================

/// Errors raised while reconstructing secp256k1 keys from external encodings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("key is not valid hex")]
    Hex(#[from] HexParseError),
    #[error("secret key does not fit into 32 bytes")]
    SecretKeyTooLong,
    #[error("secret key is zero or not below the curve order")]
    SecretKeyOutOfRange,
    #[error("public key is not a SEC1 encoded point on secp256k1")]
    InvalidPoint,
}

// SECRET KEY
// ================================================================================================

/// Static secret key of a message recipient.
#[derive(Clone)]
pub struct SecretKey {
    inner: k256::SecretKey,
}

impl SecretKey {
    /// Generates a new random secret key using the thread-local random number generator.
    #[cfg(feature = "std")]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let mut rng = rand::rng();

        Self::with_rng(&mut rng)
    }

    /// Generates a new secret key using the provided random number generator.
    pub fn with_rng<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        Self { inner: random_scalar(rng) }
    }

    /// Builds a secret key from its 32-byte big-endian encoding.
    pub fn from_bytes(bytes: &[u8; SECRET_KEY_BYTES]) -> Result<Self, KeyError> {
        let inner = k256::SecretKey::from_bytes(&FieldBytes::from(*bytes))
            .map_err(|_| KeyError::SecretKeyOutOfRange)?;

        Ok(Self { inner })
    }

    /// Parses a secret key from a hex encoded big-endian integer.
    ///
    /// The `0x` prefix is optional and shorter encodings are left-padded, so `"0x1"` and a string
    /// of 63 zeros followed by `1` describe the same key.
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let hex = strip_hex_prefix(hex);
        let even: Zeroizing<String> = if hex.len() % 2 == 1 {
            Zeroizing::new(format!("0{hex}"))
        } else {
            Zeroizing::new(hex.into())
        };

        let raw = Zeroizing::new(hex::decode(even.as_str()).map_err(HexParseError::from)?);
        let bytes =
            Zeroizing::new(canonical_scalar_bytes(&raw).map_err(|_| KeyError::SecretKeyTooLong)?);

        Self::from_bytes(&bytes)
    }

    /// Returns the 32-byte big-endian encoding of this key.
    pub fn to_bytes(&self) -> [u8; SECRET_KEY_BYTES] {
        self.inner.to_bytes().into()
    }

    /// Returns the lower-case hex encoding of this key, always 64 characters long.
    pub fn to_hex(&self) -> String {
        let bytes = Zeroizing::new(self.to_bytes());
        hex::encode(bytes.as_slice())
    }

    /// Gets the corresponding public key for this secret key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey { inner: self.inner.public_key() }
    }

    /// Computes a Diffie-Hellman shared secret from this (static) secret key and the ephemeral
    /// public key sent by the other party.
    pub fn get_shared_secret(&self, pk_e: EphemeralPublicKey) -> SharedSecret {
        let inner =
            k256::ecdh::diffie_hellman(self.inner.to_nonzero_scalar(), pk_e.inner.as_affine());

        SharedSecret { inner }
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey").finish_non_exhaustive()
    }
}

// PUBLIC KEY
// ================================================================================================

/// Static public key of a message recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    inner: k256::PublicKey,
}

impl PublicKey {
    /// Parses a SEC1 encoded point, compressed or uncompressed.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        Ok(Self { inner: decode_point(bytes)? })
    }

    /// Parses a hex encoded SEC1 point; the `0x` prefix is optional.
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let bytes = hex_to_vec(hex)?;
        Self::from_sec1_bytes(&bytes)
    }

    /// Returns the compressed SEC1 encoding of this key.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_BYTES] {
        compress(&self.inner)
    }

    /// Returns the lower-case hex of the compressed SEC1 encoding of this key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl From<EphemeralPublicKey> for PublicKey {
    fn from(key: EphemeralPublicKey) -> Self {
        Self { inner: key.inner }
    }
}

// EPHEMERAL KEYS
// ================================================================================================

/// Ephemeral public key for ECDH key agreement over secp256k1 curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EphemeralPublicKey {
    inner: k256::PublicKey,
}

impl EphemeralPublicKey {
    /// Parses a SEC1 encoded point, compressed or uncompressed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        Ok(Self { inner: decode_point(bytes)? })
    }

    /// Returns the compressed SEC1 encoding of this key.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_BYTES] {
        compress(&self.inner)
    }
}

impl From<PublicKey> for EphemeralPublicKey {
    fn from(key: PublicKey) -> Self {
        Self { inner: key.inner }
    }
}

/// Ephemeral secret key for ECDH key agreement over secp256k1 curve.
pub struct EphemeralSecretKey {
    inner: k256::SecretKey,
}

impl EphemeralSecretKey {
    /// Generates a new random ephemeral secret key using the thread-local random number generator.
    #[cfg(feature = "std")]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let mut rng = rand::rng();

        Self::with_rng(&mut rng)
    }

    /// Generates a new ephemeral secret key using the provided random number generator.
    pub fn with_rng<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        Self { inner: random_scalar(rng) }
    }

    /// Gets the corresponding ephemeral public key for this ephemeral secret key.
    pub fn ephemeral_public_key(&self) -> EphemeralPublicKey {
        EphemeralPublicKey { inner: self.inner.public_key() }
    }

    /// Computes a Diffie-Hellman shared secret from an ephemeral secret key and the (static) public
    /// key of the other party.
    pub fn diffie_hellman(&self, pk_other: PublicKey) -> SharedSecret {
        let inner =
            k256::ecdh::diffie_hellman(self.inner.to_nonzero_scalar(), pk_other.inner.as_affine());

        SharedSecret { inner }
    }
}

// SHARED SECRET
// ================================================================================================

/// A shared secret computed using the ECDH (Elliptic Curve Diffie-Hellman) key agreement.
///
/// Holds the affine x-coordinate of the shared point; it is zeroized on drop.
pub struct SharedSecret {
    inner: k256::ecdh::SharedSecret,
}

impl SharedSecret {
    /// Returns the x-coordinate of the shared point as a fixed-width 32-byte big-endian value.
    pub fn to_canonical_bytes(
        &self,
    ) -> Result<Zeroizing<[u8; SCALAR_BYTES]>, OversizedScalarError> {
        canonical_scalar_bytes(self.inner.raw_secret_bytes().as_slice()).map(Zeroizing::new)
    }
}

// HELPERS
// ================================================================================================

/// Draws uniformly random scalars until one lies in `[1, n)`.
fn random_scalar<R: CryptoRng + RngCore>(rng: &mut R) -> k256::SecretKey {
    let mut bytes = Zeroizing::new([0u8; SECRET_KEY_BYTES]);
    loop {
        rng.fill_bytes(bytes.as_mut_slice());
        if let Ok(key) = k256::SecretKey::from_bytes(&FieldBytes::from(*bytes)) {
            return key;
        }
    }
}

/// Decodes a compressed (`02`/`03`) or uncompressed (`04`) SEC1 point.
/// The identity and the compact (`05`) encoding are rejected.
fn decode_point(bytes: &[u8]) -> Result<k256::PublicKey, KeyError> {
    let encoded = EncodedPoint::from_bytes(bytes).map_err(|_| KeyError::InvalidPoint)?;
    if !matches!(encoded.tag(), Tag::CompressedEvenY | Tag::CompressedOddY | Tag::Uncompressed) {
        return Err(KeyError::InvalidPoint);
    }

    k256::PublicKey::from_sec1_bytes(bytes).map_err(|_| KeyError::InvalidPoint)
}

fn compress(key: &k256::PublicKey) -> [u8; PUBLIC_KEY_BYTES] {
    let encoded = key.to_encoded_point(true);

    let mut out = [0u8; PUBLIC_KEY_BYTES];
    out.copy_from_slice(encoded.as_bytes());
    out
}
