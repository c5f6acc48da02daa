#![no_main]

use ecies_crypto::{
    CipherObject, Content, IesError, UnsealingKey, ecdh::SecretKey, encrypt_with_rng,
};
use libfuzzer_sys::fuzz_target;

// Fixed recipient so that some inputs get past the MAC check
const SECRET_KEY: [u8; 32] = [0x11; 32];

fuzz_target!(|data: &[u8]| {
    let secret_key = SecretKey::from_bytes(&SECRET_KEY).expect("fixed key is in range");
    let unsealing_key = UnsealingKey::from(secret_key.clone());

    // Arbitrary hex split into envelope fields; this should NEVER panic
    let text = String::from_utf8_lossy(data);
    let mut fields = text.split(',');
    let envelope = CipherObject {
        iv: fields.next().unwrap_or_default().into(),
        ephemeral_pk: fields.next().unwrap_or_default().into(),
        cipher_text: fields.next().unwrap_or_default().into(),
        mac: fields.next().unwrap_or_default().into(),
        was_string: data.first().is_some_and(|byte| byte & 1 == 1),
    };
    let _ = unsealing_key.unseal(&envelope);

    // Arbitrary keys must be rejected without panicking
    let _ = ecies_crypto::decrypt(&text, &envelope);
    let mut rng = rand_from(data);
    let _ = encrypt_with_rng(&mut rng, &text, Content::Bytes(data.to_vec()));

    // A genuine envelope with one flipped byte must never authenticate
    let public_key = secret_key.public_key().to_hex();
    let sealed = encrypt_with_rng(&mut rng, &public_key, Content::Bytes(data.to_vec()))
        .expect("recipient key is valid");
    if let Some((&position, _)) = data.split_first() {
        let mut tampered = sealed.clone();
        let mut mac = hex::decode(&tampered.mac).expect("mac is hex");
        mac[position as usize % mac.len()] ^= 0x01;
        tampered.mac = hex::encode(mac);
        assert_eq!(unsealing_key.unseal(&tampered), Err(IesError::Authentication));
    }
    assert_eq!(unsealing_key.unseal(&sealed), Ok(Content::Bytes(data.to_vec())));
});

fn rand_from(data: &[u8]) -> rand_chacha::ChaCha20Rng {
    use rand::SeedableRng;

    let mut seed = [0u8; 32];
    for (slot, byte) in seed.iter_mut().zip(data) {
        *slot = *byte;
    }
    rand_chacha::ChaCha20Rng::from_seed(seed)
}
