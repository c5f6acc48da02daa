#![no_main]

use ecies_crypto::{CipherObject, decrypt};
use libfuzzer_sys::fuzz_target;

const SECRET_KEY: &str = "0x1";

fuzz_target!(|data: &[u8]| {
    // Deserializing arbitrary JSON and decrypting it should NEVER panic
    if let Ok(envelope) = serde_json::from_slice::<CipherObject>(data) {
        let _ = decrypt(SECRET_KEY, &envelope);
    }
});
