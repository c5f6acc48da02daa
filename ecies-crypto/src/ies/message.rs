use alloc::{string::String, vec::Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{crypto_box::RawSealedMessage, error::IesError};
use crate::{
    aes_cbc::{IV_SIZE, InitializationVector},
    utils::{HexParseError, hex_to_bytes, hex_to_vec},
};

// CONTENT
// ================================================================================================

/// Plaintext handed to `encrypt` and returned by `decrypt`.
///
/// The variant is recorded in the envelope so that decryption yields the same shape.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Content {
    Text(String),
    Bytes(Vec<u8>),
}

impl Content {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Content::Text(text) => text.as_bytes(),
            Content::Bytes(bytes) => bytes,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Content::Text(_))
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Content::Text(text) => text.into_bytes(),
            Content::Bytes(bytes) => bytes,
        }
    }

    /// Rebuilds content from decrypted bytes, validating UTF-8 when text was sealed.
    pub(super) fn from_plaintext(plaintext: Vec<u8>, was_string: bool) -> Result<Self, IesError> {
        if !was_string {
            return Ok(Content::Bytes(plaintext));
        }

        String::from_utf8(plaintext)
            .map(Content::Text)
            .map_err(|_| IesError::InvalidUtf8)
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.into())
    }
}

impl From<Vec<u8>> for Content {
    fn from(bytes: Vec<u8>) -> Self {
        Content::Bytes(bytes)
    }
}

impl From<&[u8]> for Content {
    fn from(bytes: &[u8]) -> Self {
        Content::Bytes(bytes.to_vec())
    }
}

// CIPHER OBJECT
// ================================================================================================

/// The ciphertext envelope: every binary field is lower-case hex.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CipherObject {
    /// 16-byte CBC initialization vector
    pub iv: String,
    /// Compressed SEC1 encoding of the ephemeral public key
    #[cfg_attr(feature = "serde", serde(rename = "ephemeralPK"))]
    pub ephemeral_pk: String,
    /// AES-256-CBC ciphertext, PKCS#7 padded
    #[cfg_attr(feature = "serde", serde(rename = "cipherText"))]
    pub cipher_text: String,
    /// HMAC-SHA256 over `iv || ephemeral_pk || cipher_text`
    pub mac: String,
    /// Whether the plaintext was text rather than raw bytes
    #[cfg_attr(feature = "serde", serde(rename = "wasString"))]
    pub was_string: bool,
}

impl CipherObject {
    pub(super) fn from_raw(raw: &RawSealedMessage, was_string: bool) -> Self {
        Self {
            iv: raw.iv.to_hex(),
            ephemeral_pk: hex::encode(&raw.ephemeral_public_key),
            cipher_text: hex::encode(&raw.ciphertext),
            mac: hex::encode(&raw.mac),
            was_string,
        }
    }

    /// Decodes the hex fields of this envelope.
    ///
    /// Only the encoding is checked here; whether the ephemeral key is a curve point and whether
    /// the MAC has the right length is left to authentication.
    pub(super) fn to_raw(&self) -> Result<RawSealedMessage, IesError> {
        let iv: [u8; IV_SIZE] = hex_to_bytes(&self.iv).map_err(malformed("iv"))?;
        let ephemeral_public_key =
            hex_to_vec(&self.ephemeral_pk).map_err(malformed("ephemeralPK"))?;
        let ciphertext = hex_to_vec(&self.cipher_text).map_err(malformed("cipherText"))?;
        let mac = hex_to_vec(&self.mac).map_err(malformed("mac"))?;

        Ok(RawSealedMessage {
            iv: InitializationVector::from(iv),
            ephemeral_public_key,
            ciphertext,
            mac,
        })
    }
}

fn malformed(field: &'static str) -> impl Fn(HexParseError) -> IesError {
    move |source| IesError::MalformedEnvelope { field, source }
}
