#![no_std]

#[macro_use]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod aes_cbc;
pub mod ecdh;
pub mod ies;
pub mod kdf;
pub mod mac;
pub mod utils;

// RE-EXPORTS
// ================================================================================================

#[cfg(feature = "std")]
pub use ies::encrypt;
pub use ies::{CipherObject, Content, IesError, SealingKey, UnsealingKey, decrypt, encrypt_with_rng};
pub use utils::scalar_to_hex;
