//! Utilities used in this crate which can also be generally useful downstream.

use alloc::{string::String, vec::Vec};

use subtle::ConstantTimeEq;
use thiserror::Error;


// CONSTANTS
// ================================================================================================

/// Width, in bytes, of a canonically encoded secp256k1 scalar or shared secret.
pub const SCALAR_BYTES: usize = 32;

/// Width, in hex characters, of a canonically encoded secp256k1 scalar or shared secret.
pub const SCALAR_HEX_LEN: usize = SCALAR_BYTES * 2;

// CONSTANT-TIME COMPARISON
// ================================================================================================

/// Returns true if `a` and `b` hold the same bytes.
///
/// Inputs of different length are rejected immediately; lengths are public in every place this
/// crate compares secrets. For inputs of equal length the running time does not depend on where
/// (or whether) the inputs differ.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}

// SCALAR ENCODING
// ================================================================================================

/// Error returned when a big-endian integer does not fit into [`SCALAR_BYTES`] bytes.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("scalar has {significant_bytes} significant bytes, more than the 32-byte bound")]
pub struct OversizedScalarError {
    pub significant_bytes: usize,
}

/// Converts an unsigned big-endian integer into exactly [`SCALAR_BYTES`] bytes.
///
/// Leading zero bytes are ignored, shorter values are left-padded with zeros. A value which needs
/// more than [`SCALAR_BYTES`] bytes is rejected rather than truncated.
pub fn canonical_scalar_bytes(
    scalar: &[u8],
) -> Result<[u8; SCALAR_BYTES], OversizedScalarError> {
    let significant = match scalar.iter().position(|&byte| byte != 0) {
        Some(start) => &scalar[start..],
        None => &scalar[scalar.len()..],
    };

    if significant.len() > SCALAR_BYTES {
        return Err(OversizedScalarError { significant_bytes: significant.len() });
    }

    let mut out = [0u8; SCALAR_BYTES];
    out[SCALAR_BYTES - significant.len()..].copy_from_slice(significant);
    Ok(out)
}

/// Renders an unsigned big-endian integer as exactly [`SCALAR_HEX_LEN`] lower-case hex characters.
///
/// The integer is first rendered without leading zeros and then left-padded with `'0'`. An integer
/// whose minimal rendering is longer than [`SCALAR_HEX_LEN`] characters is an error.
pub fn scalar_to_hex(scalar: &[u8]) -> Result<String, OversizedScalarError> {
    let encoded = hex::encode(scalar);
    let digits = encoded.trim_start_matches('0');

    if digits.len() > SCALAR_HEX_LEN {
        return Err(OversizedScalarError { significant_bytes: digits.len().div_ceil(2) });
    }

    Ok(format!("{digits:0>width$}", width = SCALAR_HEX_LEN))
}

// HEX PARSING
// ================================================================================================

/// Defines errors which can occur during parsing of hexadecimal strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HexParseError {
    #[error("expected hex data to have length {expected}, found {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("hex encoded data must have an even number of characters")]
    OddLength,
    #[error("hex encoded data must contain only characters [0-9a-fA-F]")]
    InvalidChar,
}

impl From<hex::FromHexError> for HexParseError {
    fn from(err: hex::FromHexError) -> Self {
        match err {
            hex::FromHexError::OddLength => HexParseError::OddLength,
            hex::FromHexError::InvalidHexCharacter { .. } => HexParseError::InvalidChar,
            hex::FromHexError::InvalidStringLength => HexParseError::OddLength,
        }
    }
}

/// Strips the optional `0x` prefix from a hex string.
pub fn strip_hex_prefix(value: &str) -> &str {
    value.strip_prefix("0x").unwrap_or(value)
}

/// Parses a hex string, with or without the `0x` prefix, into an array of bytes of known size.
pub fn hex_to_bytes<const N: usize>(value: &str) -> Result<[u8; N], HexParseError> {
    let value = strip_hex_prefix(value);
    let expected = N * 2;
    if value.len() != expected {
        return Err(HexParseError::InvalidLength { expected, actual: value.len() });
    }

    let mut data = [0u8; N];
    hex::decode_to_slice(value, &mut data)?;
    Ok(data)
}

/// Parses a hex string of any even length, with or without the `0x` prefix.
pub fn hex_to_vec(value: &str) -> Result<Vec<u8>, HexParseError> {
    Ok(hex::decode(strip_hex_prefix(value))?)
}
