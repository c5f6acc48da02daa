//! ECDH (Elliptic Curve Diffie-Hellman) key agreement implementations.

mod secp256k1;
pub use secp256k1::{
    EphemeralPublicKey, EphemeralSecretKey, KeyError, PUBLIC_KEY_BYTES, PublicKey,
    SECRET_KEY_BYTES, SecretKey, SharedSecret,
};
