use thiserror::Error;

use crate::{
    ecdh::KeyError,
    utils::{HexParseError, OversizedScalarError},
};

/// Error type for the Integrated Encryption Scheme (IES)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IesError {
    /// The caller supplied key is malformed or not on secp256k1.
    #[error("invalid key")]
    InvalidKey(#[from] KeyError),
    #[error(transparent)]
    OversizedScalar(#[from] OversizedScalarError),
    /// An envelope field is not valid hex, or has the wrong length where it is fixed.
    #[error("malformed envelope field `{field}`")]
    MalformedEnvelope {
        field: &'static str,
        source: HexParseError,
    },
    #[error("message authentication failed")]
    Authentication,
    /// Authenticated ciphertext did not unpad; only possible if the sender is broken.
    #[error("malformed padding in authenticated ciphertext")]
    Padding,
    #[error("decrypted text is not valid UTF-8")]
    InvalidUtf8,
}
