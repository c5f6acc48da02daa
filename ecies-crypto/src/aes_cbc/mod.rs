//! AES-256 in CBC mode with PKCS#7 padding.

use alloc::{string::String, vec::Vec};
use core::fmt;

use aes::{
    Aes256,
    cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7},
};
use rand::{CryptoRng, RngCore};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};


type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

// CONSTANTS
// ================================================================================================

/// Size of an AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of a CBC initialization vector in bytes.
pub const IV_SIZE: usize = 16;

/// Size of an AES block in bytes.
pub const BLOCK_SIZE: usize = 16;

// ERRORS
// ================================================================================================

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("ciphertext length {0} is not a positive multiple of the block size")]
    InvalidLength(usize),
    #[error("malformed PKCS#7 padding")]
    MalformedPadding,
}

// INITIALIZATION VECTOR
// ================================================================================================

/// A 128-bit CBC initialization vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitializationVector([u8; IV_SIZE]);

impl InitializationVector {
    /// Creates a new random IV using the provided random number generator
    pub fn with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut iv = [0u8; IV_SIZE];
        rng.fill_bytes(&mut iv);
        Self(iv)
    }

    pub fn as_bytes(&self) -> &[u8; IV_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; IV_SIZE]> for InitializationVector {
    fn from(bytes: [u8; IV_SIZE]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for InitializationVector {
    type Error = CipherError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let iv: [u8; IV_SIZE] =
            bytes.try_into().map_err(|_| CipherError::InvalidLength(bytes.len()))?;
        Ok(Self(iv))
    }
}

// SECRET KEY
// ================================================================================================

/// A 256-bit AES key; wiped from memory when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; KEY_SIZE]);

impl SecretKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Encrypts `plaintext` under this key and `iv`.
    ///
    /// The output is always a non-empty multiple of [`BLOCK_SIZE`]: a full block of padding is
    /// appended when the plaintext length is already block aligned, so an empty plaintext becomes
    /// a single block.
    pub fn encrypt(&self, iv: &InitializationVector, plaintext: &[u8]) -> Vec<u8> {
        Aes256CbcEnc::new(&self.0.into(), &iv.0.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
    }

    /// Decrypts `ciphertext` under this key and `iv`, removing the PKCS#7 padding.
    pub fn decrypt(
        &self,
        iv: &InitializationVector,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(CipherError::InvalidLength(ciphertext.len()));
        }

        Aes256CbcDec::new(&self.0.into(), &iv.0.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CipherError::MalformedPadding)
    }
}

impl From<[u8; KEY_SIZE]> for SecretKey {
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}
