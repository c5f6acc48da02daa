#![cfg(feature = "std")]
use alloc::{string::String, vec::Vec};

use assert_matches::assert_matches;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rstest::rstest;

use super::*;
use crate::{
    aes_cbc::{BLOCK_SIZE, IV_SIZE},
    ecdh::{EphemeralPublicKey, KeyError, PUBLIC_KEY_BYTES, SecretKey},
    kdf::DerivedKeys,
    mac::{MAC_SIZE, hmac_sha256},
    utils::HexParseError,
};

// HELPERS
// ================================================================================================

fn recipient(seed: u8) -> SecretKey {
    SecretKey::with_rng(&mut ChaCha20Rng::from_seed([seed; 32]))
}

fn seal_seeded(secret_key: &SecretKey, seed: u8, content: Content) -> CipherObject {
    let mut rng = ChaCha20Rng::from_seed([seed; 32]);
    encrypt_with_rng(&mut rng, &secret_key.public_key().to_hex(), content).unwrap()
}

/// Re-derives the symmetric keys the sender used for `envelope`.
fn derived_keys(secret_key: &SecretKey, envelope: &CipherObject) -> DerivedKeys {
    let ephemeral_bytes = hex::decode(&envelope.ephemeral_pk).unwrap();
    let ephemeral = EphemeralPublicKey::from_bytes(&ephemeral_bytes).unwrap();
    let shared_secret = secret_key.get_shared_secret(ephemeral).to_canonical_bytes().unwrap();

    DerivedKeys::from_shared_secret(shared_secret.as_slice())
}

fn flip_bit(hex_field: &str, bit: usize) -> String {
    let mut bytes = hex::decode(hex_field).unwrap();
    let bit = bit % (bytes.len() * 8);
    bytes[bit / 8] ^= 1 << (bit % 8);
    hex::encode(bytes)
}

// ROUND TRIP
// ================================================================================================

#[rstest]
#[case::text(Content::Text("hello world".into()))]
#[case::empty_text(Content::Text(String::new()))]
#[case::unicode_text(Content::Text("ключ 🔑 clé".into()))]
#[case::bytes(Content::Bytes(vec![0, 1, 2, 0xff, 0xfe]))]
#[case::empty_bytes(Content::Bytes(Vec::new()))]
#[case::block_aligned_bytes(Content::Bytes(vec![0x42; 2 * BLOCK_SIZE]))]
fn encrypt_then_decrypt_returns_content(#[case] content: Content) {
    let secret_key = recipient(1);

    let envelope = encrypt(&secret_key.public_key().to_hex(), content.clone()).unwrap();
    assert_eq!(envelope.was_string, content.is_text());

    let decrypted = decrypt(&secret_key.to_hex(), &envelope).unwrap();
    assert_eq!(decrypted, content);
}

#[test]
fn hello_world_twice_gives_unrelated_envelopes() {
    let secret_key = recipient(2);
    let public_key_hex = secret_key.public_key().to_hex();

    let first = encrypt(&public_key_hex, "hello world".into()).unwrap();
    let second = encrypt(&public_key_hex, "hello world".into()).unwrap();

    assert_ne!(first.iv, second.iv);
    assert_ne!(first.ephemeral_pk, second.ephemeral_pk);
    assert_ne!(first.cipher_text, second.cipher_text);
    assert_ne!(first.mac, second.mac);

    for envelope in [&first, &second] {
        assert!(envelope.was_string);
        assert_eq!(
            decrypt(&secret_key.to_hex(), envelope).unwrap(),
            Content::Text("hello world".into())
        );
    }
}

#[test]
fn envelope_fields_have_fixed_widths() {
    let secret_key = recipient(3);
    let envelope = seal_seeded(&secret_key, 4, "hello world".into());

    assert_eq!(envelope.iv.len(), IV_SIZE * 2);
    assert_eq!(envelope.ephemeral_pk.len(), PUBLIC_KEY_BYTES * 2);
    assert!(envelope.ephemeral_pk.starts_with("02") || envelope.ephemeral_pk.starts_with("03"));
    assert_eq!(envelope.mac.len(), MAC_SIZE * 2);
    // 11 bytes pad to one block
    assert_eq!(envelope.cipher_text.len(), BLOCK_SIZE * 2);

    for field in [&envelope.iv, &envelope.ephemeral_pk, &envelope.cipher_text, &envelope.mac] {
        assert_eq!(field, &field.to_lowercase());
    }
}

#[test]
fn empty_content_is_a_single_block() {
    let secret_key = recipient(3);
    let envelope = seal_seeded(&secret_key, 5, Content::Bytes(Vec::new()));

    assert_eq!(envelope.cipher_text.len(), BLOCK_SIZE * 2);
    assert_eq!(decrypt(&secret_key.to_hex(), &envelope).unwrap(), Content::Bytes(Vec::new()));
}

#[test]
fn seeded_envelope_matches_known_answer() {
    let secret_key = recipient(50);
    assert_eq!(
        secret_key.to_hex(),
        "782745ea4021d6625d825463b15202555cb9861db95b8cee27c75b2f503c108f"
    );

    let envelope = seal_seeded(&secret_key, 51, "hello world".into());

    assert_eq!(envelope.iv, "34467d48bd3587a10b17905d9bcd915d");
    assert_eq!(
        envelope.ephemeral_pk,
        "023f6f0f48ab8f2dac2419f75e8c08bb9153ea40e7cc2bb19deee882bdeea786f8"
    );
    assert_eq!(envelope.cipher_text, "ab538726c4489ddf2baffa0aa6746287");
    assert_eq!(envelope.mac, "e48a78d03368cf6f88ff287701ebb5c8c996989d00a66c385313a9a0dd11439a");
    assert!(envelope.was_string);
}

#[test]
fn seeded_rng_reproduces_envelope() {
    let secret_key = recipient(6);

    let a = seal_seeded(&secret_key, 7, "deterministic".into());
    let b = seal_seeded(&secret_key, 7, "deterministic".into());
    let c = seal_seeded(&secret_key, 8, "deterministic".into());

    assert_eq!(a, b);
    assert_ne!(a.iv, c.iv);
    assert_ne!(a.ephemeral_pk, c.ephemeral_pk);
}

#[test]
fn typed_keys_match_hex_entry_points() {
    let secret_key = recipient(9);
    let unsealing_key = UnsealingKey::from(secret_key.clone());
    let sealing_key = unsealing_key.sealing_key();
    assert_eq!(sealing_key, SealingKey::from_hex(&secret_key.public_key().to_hex()).unwrap());

    let mut rng = ChaCha20Rng::from_seed([10; 32]);
    let typed = sealing_key.seal_with_rng(&mut rng, &Content::from(&b"raw"[..])).unwrap();
    let untyped = seal_seeded(&secret_key, 10, Content::from(vec![b'r', b'a', b'w']));
    assert_eq!(typed, untyped);

    assert_eq!(unsealing_key.unseal(&typed).unwrap(), Content::Bytes(b"raw".to_vec()));
    assert_eq!(sealing_key.seal(&"text".into()).map(|e| e.was_string), Ok(true));
}

#[test]
fn recipient_key_may_be_uncompressed_or_prefixed() {
    let secret_key = recipient(11);
    let compressed = secret_key.public_key().to_hex();
    let point = k256::PublicKey::from_sec1_bytes(&hex::decode(&compressed).unwrap()).unwrap();
    let uncompressed = hex::encode(point.to_encoded_point(false).as_bytes());
    assert_eq!(uncompressed.len(), 130);

    for public_key_hex in [uncompressed, format!("0x{compressed}")] {
        let envelope = encrypt(&public_key_hex, "hi".into()).unwrap();
        assert_eq!(decrypt(&secret_key.to_hex(), &envelope).unwrap(), Content::from("hi"));
    }
}

// AUTHENTICATION
// ================================================================================================

#[test]
fn mac_covers_iv_ephemeral_key_and_ciphertext() {
    let secret_key = recipient(12);
    let envelope = seal_seeded(&secret_key, 13, "hello world".into());
    let keys = derived_keys(&secret_key, &envelope);

    let mut mac_input = hex::decode(&envelope.iv).unwrap();
    mac_input.extend(hex::decode(&envelope.ephemeral_pk).unwrap());
    mac_input.extend(hex::decode(&envelope.cipher_text).unwrap());

    assert_eq!(hmac_sha256(keys.hmac_key(), &mac_input).to_hex(), envelope.mac);
}

#[test]
fn wrong_key_fails_authentication() {
    let envelope = seal_seeded(&recipient(14), 15, "secret".into());

    assert_matches!(
        decrypt(&recipient(16).to_hex(), &envelope),
        Err(IesError::Authentication)
    );
}

#[rstest]
#[case::iv(0)]
#[case::ephemeral_pk(1)]
#[case::cipher_text(2)]
#[case::mac(3)]
fn tampered_field_fails_authentication(#[case] field: usize) {
    let secret_key = recipient(17);
    let envelope = seal_seeded(&secret_key, 18, "hello world".into());

    // first bit, a middle bit and the last bit of the field
    for bit in [0, 41, usize::MAX] {
        let mut tampered = envelope.clone();
        let target = match field {
            0 => &mut tampered.iv,
            1 => &mut tampered.ephemeral_pk,
            2 => &mut tampered.cipher_text,
            _ => &mut tampered.mac,
        };
        let bit = if bit == usize::MAX { target.len() * 4 - 1 } else { bit };
        *target = flip_bit(target, bit);

        assert_matches!(decrypt(&secret_key.to_hex(), &tampered), Err(IesError::Authentication));
    }
}

#[test]
fn truncated_or_extended_mac_fails_authentication() {
    let secret_key = recipient(19);
    let envelope = seal_seeded(&secret_key, 20, "hello".into());

    let mut short = envelope.clone();
    short.mac.truncate(short.mac.len() - 2);
    assert_matches!(decrypt(&secret_key.to_hex(), &short), Err(IesError::Authentication));

    let mut long = envelope.clone();
    long.mac.push_str("00");
    assert_matches!(decrypt(&secret_key.to_hex(), &long), Err(IesError::Authentication));

    let mut empty = envelope;
    empty.mac.clear();
    assert_matches!(decrypt(&secret_key.to_hex(), &empty), Err(IesError::Authentication));
}

#[test]
fn ephemeral_key_off_curve_fails_authentication() {
    let secret_key = recipient(21);
    let mut envelope = seal_seeded(&secret_key, 22, "hello".into());
    envelope.ephemeral_pk = format!("05{}", &envelope.ephemeral_pk[2..]);

    assert_matches!(decrypt(&secret_key.to_hex(), &envelope), Err(IesError::Authentication));
}

#[test]
fn compact_ephemeral_key_fails_authentication() {
    let secret_key = recipient(41);
    let mut envelope = seal_seeded(&secret_key, 42, "hello".into());

    // same x coordinate, compact SEC1 tag
    envelope.ephemeral_pk.replace_range(0..2, "05");
    assert_matches!(decrypt(&secret_key.to_hex(), &envelope), Err(IesError::Authentication));
}

#[test]
fn uncompressed_ephemeral_key_is_accepted() {
    let secret_key = recipient(23);
    let mut envelope = seal_seeded(&secret_key, 24, "hello".into());

    let point = k256::PublicKey::from_sec1_bytes(&hex::decode(&envelope.ephemeral_pk).unwrap())
        .unwrap();
    envelope.ephemeral_pk = hex::encode(point.to_encoded_point(false).as_bytes());

    assert_eq!(decrypt(&secret_key.to_hex(), &envelope).unwrap(), Content::from("hello"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn any_single_bit_flip_is_rejected(
        plaintext in proptest::collection::vec(any::<u8>(), 0..64),
        field in 0usize..4,
        bit in any::<usize>(),
    ) {
        let secret_key = recipient(25);
        let envelope = seal_seeded(&secret_key, 26, Content::Bytes(plaintext));

        let mut tampered = envelope.clone();
        let target = match field {
            0 => &mut tampered.iv,
            1 => &mut tampered.ephemeral_pk,
            2 => &mut tampered.cipher_text,
            _ => &mut tampered.mac,
        };
        *target = flip_bit(target, bit);

        prop_assert_eq!(decrypt(&secret_key.to_hex(), &tampered), Err(IesError::Authentication));
    }
}

// ERRORS
// ================================================================================================

#[test]
fn authenticated_bad_padding_is_a_padding_error() {
    let secret_key = recipient(27);
    let mut envelope = seal_seeded(&secret_key, 28, Content::Bytes(Vec::new()));
    let keys = derived_keys(&secret_key, &envelope);

    // the single block decrypts to sixteen 0x10 bytes; flipping bit 4 of the last IV byte turns
    // the final byte into 0x00, which is not valid padding
    let mut iv = hex::decode(&envelope.iv).unwrap();
    iv[IV_SIZE - 1] ^= 0x10;

    let ephemeral_pk = hex::decode(&envelope.ephemeral_pk).unwrap();
    let cipher_text = hex::decode(&envelope.cipher_text).unwrap();
    let mac = keys.authenticate([iv.as_slice(), ephemeral_pk.as_slice(), cipher_text.as_slice()]);

    envelope.iv = hex::encode(&iv);
    envelope.mac = mac.to_hex();

    assert_matches!(decrypt(&secret_key.to_hex(), &envelope), Err(IesError::Padding));
}

#[test]
fn authenticated_unaligned_ciphertext_is_a_padding_error() {
    let secret_key = recipient(29);
    let mut envelope = seal_seeded(&secret_key, 30, "hello".into());
    let keys = derived_keys(&secret_key, &envelope);

    let iv = hex::decode(&envelope.iv).unwrap();
    let ephemeral_pk = hex::decode(&envelope.ephemeral_pk).unwrap();
    let mut cipher_text = hex::decode(&envelope.cipher_text).unwrap();
    cipher_text.pop();
    let mac = keys.authenticate([iv.as_slice(), ephemeral_pk.as_slice(), cipher_text.as_slice()]);

    envelope.cipher_text = hex::encode(&cipher_text);
    envelope.mac = mac.to_hex();

    assert_matches!(decrypt(&secret_key.to_hex(), &envelope), Err(IesError::Padding));
}

#[test]
fn text_flag_with_binary_plaintext_is_invalid_utf8() {
    let secret_key = recipient(31);
    let mut envelope = seal_seeded(&secret_key, 32, Content::Bytes(vec![0xff, 0xfe, 0xfd]));
    envelope.was_string = true;

    assert_matches!(decrypt(&secret_key.to_hex(), &envelope), Err(IesError::InvalidUtf8));
}

#[test]
fn bytes_flag_returns_text_as_bytes() {
    let secret_key = recipient(33);
    let mut envelope = seal_seeded(&secret_key, 34, "plain".into());
    envelope.was_string = false;

    assert_eq!(
        decrypt(&secret_key.to_hex(), &envelope).unwrap(),
        Content::Bytes(b"plain".to_vec())
    );
}

#[rstest]
#[case::not_hex("zz")]
#[case::off_curve(&format!("02{}", "ff".repeat(32)))]
#[case::empty("")]
#[case::identity("00")]
fn encrypt_rejects_invalid_public_key(#[case] public_key_hex: &str) {
    let mut rng = ChaCha20Rng::from_seed([35; 32]);
    assert_matches!(
        encrypt_with_rng(&mut rng, public_key_hex, "x".into()),
        Err(IesError::InvalidKey(_))
    );
}

#[test]
fn encrypt_rejects_compact_recipient_key() {
    let compressed = recipient(43).public_key().to_hex();
    let compact = format!("05{}", &compressed[2..]);

    let mut rng = ChaCha20Rng::from_seed([44; 32]);
    assert_matches!(
        encrypt_with_rng(&mut rng, &compact, "x".into()),
        Err(IesError::InvalidKey(KeyError::InvalidPoint))
    );
}

#[test]
fn decrypt_rejects_invalid_private_key_before_reading_envelope() {
    let envelope = CipherObject {
        iv: "not hex".into(),
        ephemeral_pk: String::new(),
        cipher_text: String::new(),
        mac: String::new(),
        was_string: false,
    };

    assert_matches!(
        decrypt("00", &envelope),
        Err(IesError::InvalidKey(KeyError::SecretKeyOutOfRange))
    );
    assert_matches!(decrypt("xyz", &envelope), Err(IesError::InvalidKey(KeyError::Hex(_))));
}

#[test]
fn malformed_envelope_names_the_field() {
    let secret_key = recipient(36);
    let envelope = seal_seeded(&secret_key, 37, "hello".into());
    let key_hex = secret_key.to_hex();

    let mut bad_iv = envelope.clone();
    bad_iv.iv = "zz".repeat(IV_SIZE);
    assert_matches!(
        decrypt(&key_hex, &bad_iv),
        Err(IesError::MalformedEnvelope { field: "iv", source: HexParseError::InvalidChar })
    );

    let mut short_iv = envelope.clone();
    short_iv.iv.truncate(30);
    assert_matches!(
        decrypt(&key_hex, &short_iv),
        Err(IesError::MalformedEnvelope {
            field: "iv",
            source: HexParseError::InvalidLength { expected: 32, actual: 30 }
        })
    );

    let mut odd_ciphertext = envelope.clone();
    odd_ciphertext.cipher_text.push('a');
    assert_matches!(
        decrypt(&key_hex, &odd_ciphertext),
        Err(IesError::MalformedEnvelope { field: "cipherText", source: HexParseError::OddLength })
    );

    let mut bad_mac = envelope.clone();
    bad_mac.mac.replace_range(0..2, "g0");
    assert_matches!(
        decrypt(&key_hex, &bad_mac),
        Err(IesError::MalformedEnvelope { field: "mac", .. })
    );

    let mut bad_ephemeral = envelope;
    bad_ephemeral.ephemeral_pk.insert(0, '0');
    assert_matches!(
        decrypt(&key_hex, &bad_ephemeral),
        Err(IesError::MalformedEnvelope { field: "ephemeralPK", .. })
    );
}

// WIRE FORMAT
// ================================================================================================

#[cfg(feature = "serde")]
#[test]
fn envelope_serializes_with_camel_case_fields() {
    let secret_key = recipient(38);
    let envelope = seal_seeded(&secret_key, 39, "hello world".into());

    let json = serde_json::to_value(&envelope).unwrap();
    let object = json.as_object().unwrap();
    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["cipherText", "ephemeralPK", "iv", "mac", "wasString"]);
    assert_eq!(object["wasString"], serde_json::Value::Bool(true));
    assert_eq!(object["ephemeralPK"], serde_json::Value::String(envelope.ephemeral_pk.clone()));

    let text = serde_json::to_string(&json).unwrap();
    let parsed: CipherObject = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, envelope);
    assert_eq!(decrypt(&secret_key.to_hex(), &parsed).unwrap(), Content::from("hello world"));
}

#[cfg(feature = "serde")]
#[test]
fn envelope_parses_from_foreign_json() {
    let json = r#"{
        "iv": "000102030405060708090a0b0c0d0e0f",
        "ephemeralPK": "02aa",
        "cipherText": "",
        "mac": "",
        "wasString": false
    }"#;

    let envelope: CipherObject = serde_json::from_str(json).unwrap();
    assert_eq!(envelope.iv, "000102030405060708090a0b0c0d0e0f");
    assert!(!envelope.was_string);
    assert_matches!(decrypt(&recipient(40).to_hex(), &envelope), Err(IesError::Authentication));
}
