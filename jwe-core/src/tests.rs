//! End-to-end envelope scenarios.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use pretty_assertions::assert_eq;
use rand_core::OsRng;
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::{
    ContentEncryptionAlgorithm, Error, JoseHeaders, Jwe, KeyManagementAlgorithm,
};

const PLAINTEXT: &[u8] = b"I have a message for you.";

const KEY_MANAGEMENT: [KeyManagementAlgorithm; 2] = [
    KeyManagementAlgorithm::RsaOaep,
    KeyManagementAlgorithm::Rsa1_5,
];

const CONTENT_ENCRYPTION: [ContentEncryptionAlgorithm; 6] = [
    ContentEncryptionAlgorithm::A128Gcm,
    ContentEncryptionAlgorithm::A192Gcm,
    ContentEncryptionAlgorithm::A256Gcm,
    ContentEncryptionAlgorithm::A128CbcHs256,
    ContentEncryptionAlgorithm::A192CbcHs384,
    ContentEncryptionAlgorithm::A256CbcHs512,
];

fn test_keypair() -> (RsaPublicKey, RsaPrivateKey) {
    let private = RsaPrivateKey::new(&mut OsRng, 2048).expect("RSA key generation");
    (RsaPublicKey::from(&private), private)
}

#[test]
fn test_compact_roundtrip_all_algorithm_pairs() {
    let (public, private) = test_keypair();

    for alg in KEY_MANAGEMENT {
        for enc in CONTENT_ENCRYPTION {
            let headers = JoseHeaders::new(alg, enc);
            let jwe = Jwe::encrypt(&headers, &public, PLAINTEXT).unwrap();
            let compact = jwe.compact();

            let received = Jwe::from_compact(&compact).unwrap();
            let plaintext = received.decrypt(&private).unwrap();

            assert_eq!(PLAINTEXT, &plaintext[..], "{alg} / {enc}");
        }
    }
}

#[test]
fn test_header_fields_survive_the_wire() {
    let (public, private) = test_keypair();
    let headers = JoseHeaders::new(
        KeyManagementAlgorithm::RsaOaep,
        ContentEncryptionAlgorithm::A128CbcHs256,
    )
    .with_key_id("recipient-key-1");

    let compact = Jwe::encrypt(&headers, &public, PLAINTEXT).unwrap().compact();
    let received = Jwe::from_compact(&compact).unwrap();

    let parsed = JoseHeaders::from_protected(&received.protected).unwrap();
    assert_eq!(parsed.kid.as_deref(), Some("recipient-key-1"));
    assert_eq!(received.decrypt(&private).unwrap(), PLAINTEXT);
}

#[test]
fn test_wrong_recipient_key_is_rejected() {
    let (public, _) = test_keypair();
    let (_, other_private) = test_keypair();

    for alg in KEY_MANAGEMENT {
        let headers = JoseHeaders::new(alg, ContentEncryptionAlgorithm::A128CbcHs256);
        let jwe = Jwe::encrypt(&headers, &public, PLAINTEXT).unwrap();

        let result = jwe.decrypt(&other_private);
        assert!(
            matches!(result, Err(Error::KeyUnwrapFailed)),
            "{alg}: {result:?}"
        );
    }
}

/// Flips one bit in the middle of a base64url segment.
fn flip_bit(segment: &str) -> String {
    let mut bytes = URL_SAFE_NO_PAD.decode(segment).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0x01;
    URL_SAFE_NO_PAD.encode(bytes)
}

#[test]
fn test_tampered_segments_are_rejected() {
    let (public, private) = test_keypair();

    for enc in CONTENT_ENCRYPTION {
        let headers = JoseHeaders::new(KeyManagementAlgorithm::RsaOaep, enc);
        let jwe = Jwe::encrypt(&headers, &public, PLAINTEXT).unwrap();

        let mut tampered = jwe.clone();
        tampered.encrypted_key = flip_bit(&jwe.encrypted_key);
        assert!(
            matches!(tampered.decrypt(&private), Err(Error::KeyUnwrapFailed)),
            "{enc} encrypted key"
        );

        let mut tampered = jwe.clone();
        tampered.iv = flip_bit(&jwe.iv);
        assert!(
            matches!(tampered.decrypt(&private), Err(Error::AuthenticationFailed)),
            "{enc} IV"
        );

        let mut tampered = jwe.clone();
        tampered.ciphertext = flip_bit(&jwe.ciphertext);
        assert!(
            matches!(tampered.decrypt(&private), Err(Error::AuthenticationFailed)),
            "{enc} ciphertext"
        );

        let mut tampered = jwe.clone();
        tampered.tag = flip_bit(&jwe.tag);
        assert!(
            matches!(tampered.decrypt(&private), Err(Error::AuthenticationFailed)),
            "{enc} tag"
        );

        let mut tampered = jwe;
        tampered.protected = flip_bit(&tampered.protected);
        assert!(tampered.decrypt(&private).is_err(), "{enc} protected header");
    }
}

#[test]
fn test_rejected_headers_fail_before_any_key_operation() {
    let (_, private) = test_keypair();

    // Garbage in every other segment: if header validation did not run
    // first, these would surface as key unwrap failures instead.
    let craft = |header_json: &str| Jwe {
        protected: URL_SAFE_NO_PAD.encode(header_json),
        encrypted_key: URL_SAFE_NO_PAD.encode([0u8; 256]),
        iv: URL_SAFE_NO_PAD.encode([0u8; 16]),
        ciphertext: URL_SAFE_NO_PAD.encode([0u8; 16]),
        tag: URL_SAFE_NO_PAD.encode([0u8; 16]),
    };

    let signature_alg = craft(r#"{"alg":"PS256","enc":"A128CBC-HS256"}"#);
    assert!(matches!(
        signature_alg.decrypt(&private),
        Err(Error::UnsupportedAlgorithm(name)) if name == "PS256"
    ));

    let unknown_enc = craft(r#"{"alg":"RSA-OAEP","enc":"POOP"}"#);
    assert!(matches!(
        unknown_enc.decrypt(&private),
        Err(Error::UnsupportedAlgorithm(name)) if name == "POOP"
    ));

    let no_alg = craft(r#"{"enc":"A128CBC-HS256"}"#);
    assert!(matches!(
        no_alg.decrypt(&private),
        Err(Error::MalformedEnvelope(_))
    ));
}

#[test]
fn test_malformed_compact_forms() {
    let (public, _) = test_keypair();
    let headers = JoseHeaders::new(
        KeyManagementAlgorithm::RsaOaep,
        ContentEncryptionAlgorithm::A256Gcm,
    );
    let compact = Jwe::encrypt(&headers, &public, PLAINTEXT).unwrap().compact();

    let cases = [
        String::new(),
        "only-one-segment".to_owned(),
        "a.b.c.d".to_owned(),
        format!("{compact}.extra"),
        compact.replacen('.', "..", 1),
        compact.replacen(|c: char| c.is_ascii_alphanumeric(), "!", 1),
    ];

    for case in &cases {
        assert!(
            matches!(Jwe::from_compact(case), Err(Error::MalformedEnvelope(_))),
            "accepted: {case:?}"
        );
    }
}

#[test]
fn test_plaintext_length_sweep_through_compact_form() {
    let (public, private) = test_keypair();

    for enc in [
        ContentEncryptionAlgorithm::A256Gcm,
        ContentEncryptionAlgorithm::A128CbcHs256,
    ] {
        let headers = JoseHeaders::new(KeyManagementAlgorithm::RsaOaep, enc);
        // Length zero is covered on the envelope directly; the GCM
        // ciphertext segment would be empty in compact form.
        for len in 1..=33 {
            let plaintext = vec![0x42u8; len];
            let compact = Jwe::encrypt(&headers, &public, &plaintext).unwrap().compact();
            let received = Jwe::from_compact(&compact).unwrap();
            assert_eq!(received.decrypt(&private).unwrap(), plaintext, "{enc} len {len}");
        }
    }
}
