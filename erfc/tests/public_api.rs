//! End-to-end tests over the public API: round-trip, tamper detection,
//! and input validation, exercised the way an embedding shell would.

use erfc::{decrypt, encrypt, ErfcError, TRAILER_LEN};

// ═══════════════════════════════════════════════════════════════════════
// Round-trip
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn roundtrip_representative_inputs() {
    let keys = ["mySecretKey", "k", "correct horse battery staple", "鍵emoji🔑ok"];
    let plaintexts = [
        "a",
        "Z9",
        "Hello123",
        "TheQuickBrownFox1234567890",
        "0000000000",
        "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789",
    ];

    for key in keys {
        for plain in plaintexts {
            let out = encrypt(plain, key).unwrap();
            let recovered = decrypt(&out.ciphertext, key, &out.digest).unwrap();
            assert_eq!(recovered, plain, "roundtrip failed for key={:?}", key);
        }
    }
}

#[test]
fn roundtrip_at_maximum_length() {
    let plain = "x".repeat(9999);
    let key = "boundary-key";
    let out = encrypt(&plain, key).unwrap();
    assert_eq!(decrypt(&out.ciphertext, key, &out.digest).unwrap(), plain);
}

#[test]
fn repeated_encryptions_share_shape_but_not_decoys() {
    let a = encrypt("RepeatMe77", "shape-key").unwrap();
    let b = encrypt("RepeatMe77", "shape-key").unwrap();

    // Grid shape is key-determined, so the lengths always agree.
    assert_eq!(a.ciphertext.chars().count(), b.ciphertext.chars().count());

    // Each ciphertext verifies against its own digest.
    assert_eq!(decrypt(&a.ciphertext, "shape-key", &a.digest).unwrap(), "RepeatMe77");
    assert_eq!(decrypt(&b.ciphertext, "shape-key", &b.digest).unwrap(), "RepeatMe77");
}

// ═══════════════════════════════════════════════════════════════════════
// Validation
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn rejects_non_alphanumeric_plaintext() {
    for plain in ["abc!", "with space", "tab\there", "héllo", "emoji😀", ""] {
        assert_eq!(
            encrypt(plain, "k").unwrap_err(),
            ErfcError::NotAlphanumeric,
            "expected rejection for {:?}",
            plain
        );
    }
}

#[test]
fn rejects_over_long_plaintext() {
    let plain = "a".repeat(10_000);
    assert_eq!(
        encrypt(&plain, "k").unwrap_err(),
        ErfcError::PlaintextTooLong { chars: 10_000 }
    );
}

#[test]
fn rejects_ciphertext_shorter_than_trailer() {
    assert_eq!(
        decrypt("tooshort", "k", "00").unwrap_err(),
        ErfcError::CiphertextTooShort { chars: 8 }
    );
    assert_eq!(
        decrypt("", "k", "00").unwrap_err(),
        ErfcError::CiphertextTooShort { chars: 0 }
    );
}

#[test]
fn rejects_truncated_grid_body() {
    let out = encrypt("Truncate1", "trunc-key").unwrap();
    // Dropping one leading grid cell leaves the trailer intact but shifts
    // the body length off the recomputed dimensions.
    let shortened: String = out.ciphertext.chars().skip(1).collect();
    assert!(matches!(
        decrypt(&shortened, "trunc-key", &out.digest).unwrap_err(),
        ErfcError::BodyLengthMismatch { .. }
    ));
}

#[test]
fn rejects_garbage_trailer() {
    let out = encrypt("GoodBody9", "trailer-key").unwrap();
    let chars: Vec<char> = out.ciphertext.chars().collect();
    let body: String = chars[..chars.len() - TRAILER_LEN].iter().collect();
    let tampered = format!("{}{}", body, "zzzzzzzzAAAAAAAAAAAA");
    assert_eq!(
        decrypt(&tampered, "trailer-key", &out.digest).unwrap_err(),
        ErfcError::TrailerMalformed
    );
}

// ═══════════════════════════════════════════════════════════════════════
// Integrity
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn wrong_digest_is_rejected() {
    let out = encrypt("Integrity1", "int-key").unwrap();

    let mut flipped = out.digest.clone().into_bytes();
    flipped[10] = if flipped[10] == b'a' { b'b' } else { b'a' };
    let flipped = String::from_utf8(flipped).unwrap();

    assert_eq!(
        decrypt(&out.ciphertext, "int-key", &flipped).unwrap_err(),
        ErfcError::DigestMismatch
    );
}

#[test]
fn wrong_key_never_verifies() {
    let out = encrypt("KeyMatters", "right-key").unwrap();
    // Whatever stage the wrong key trips up first, the call must fail; the
    // digest covers the key, so a clean decode can never slip through.
    assert!(decrypt(&out.ciphertext, "wrong-key", &out.digest).is_err());
}
