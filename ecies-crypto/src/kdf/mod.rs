//! Derivation of the symmetric keys used by the integrated encryption scheme.
//!
//! The shared secret is hashed with SHA-512; the first half of the digest becomes the AES-256
//! encryption key and the second half the HMAC-SHA256 key.

use core::fmt;

use sha2::{Digest, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{aes_cbc, mac};

/// Size, in bytes, of each key split off the SHA-512 digest.
pub const DERIVED_KEY_SIZE: usize = 32;

/// The encryption key and the HMAC key derived from one shared secret.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKeys {
    encryption_key: [u8; DERIVED_KEY_SIZE],
    hmac_key: [u8; DERIVED_KEY_SIZE],
}

impl DerivedKeys {
    /// Hashes `shared_secret` with SHA-512 and splits the digest into two 32-byte keys.
    pub fn from_shared_secret(shared_secret: &[u8]) -> Self {
        let mut digest = Sha512::digest(shared_secret);

        let mut encryption_key = [0u8; DERIVED_KEY_SIZE];
        let mut hmac_key = [0u8; DERIVED_KEY_SIZE];
        encryption_key.copy_from_slice(&digest[..DERIVED_KEY_SIZE]);
        hmac_key.copy_from_slice(&digest[DERIVED_KEY_SIZE..]);
        digest.as_mut_slice().zeroize();

        Self { encryption_key, hmac_key }
    }

    pub fn encryption_key(&self) -> &[u8; DERIVED_KEY_SIZE] {
        &self.encryption_key
    }

    pub fn hmac_key(&self) -> &[u8; DERIVED_KEY_SIZE] {
        &self.hmac_key
    }

    /// Returns the AES-256 key for the CBC layer.
    pub fn cipher_key(&self) -> aes_cbc::SecretKey {
        aes_cbc::SecretKey::from_bytes(self.encryption_key)
    }

    /// Computes the HMAC-SHA256 tag over the concatenation of `parts`.
    pub fn authenticate<'a>(&self, parts: impl IntoIterator<Item = &'a [u8]>) -> mac::MacTag {
        mac::hmac_sha256_parts(&self.hmac_key, parts)
    }
}

impl fmt::Debug for DerivedKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKeys").finish_non_exhaustive()
    }
}
