//! HMAC-SHA256 message authentication.

use alloc::string::String;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::utils::constant_time_eq;


type HmacSha256 = Hmac<Sha256>;

/// Size of an HMAC-SHA256 tag in bytes.
pub const MAC_SIZE: usize = 32;

// MAC TAG
// ================================================================================================

/// An HMAC-SHA256 authentication tag.
///
/// Tags do not implement `PartialEq`; compare them with [`MacTag::verify`].
#[derive(Debug, Clone, Copy)]
pub struct MacTag([u8; MAC_SIZE]);

impl MacTag {
    pub fn as_bytes(&self) -> &[u8; MAC_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns true if `received` equals this tag.
    ///
    /// Runs in time independent of the content of `received`; a tag of the wrong length is
    /// rejected.
    pub fn verify(&self, received: &[u8]) -> bool {
        constant_time_eq(&self.0, received)
    }
}

// HMAC
// ================================================================================================

/// Computes HMAC-SHA256 of `content` under `key`.
pub fn hmac_sha256(key: &[u8], content: &[u8]) -> MacTag {
    hmac_sha256_parts(key, [content])
}

/// Computes HMAC-SHA256 over the concatenation of `parts` under `key`.
pub fn hmac_sha256_parts<'a>(key: &[u8], parts: impl IntoIterator<Item = &'a [u8]>) -> MacTag {
    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(key).expect("HMAC accepts keys of any length");
    for part in parts {
        mac.update(part);
    }

    MacTag(mac.finalize().into_bytes().into())
}
