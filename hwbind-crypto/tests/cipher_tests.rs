use hwbind_crypto::{
    decrypt, decrypt_bytes, decrypt_record, encrypt, encrypt_record, generate_random_key,
    CryptoError, EncryptedData, NONCE_SIZE, TAG_SIZE,
};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Record {
    name: String,
    count: u32,
    tags: Vec<String>,
}

fn sample() -> Record {
    Record {
        name: "abc123".into(),
        count: 7,
        tags: vec!["a".into(), "b".into()],
    }
}

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = generate_random_key();
    let plaintext = b"Hello, World!";
    let encrypted = encrypt(&key, plaintext).unwrap();
    let decrypted = decrypt(&key, &encrypted).unwrap();
    assert_eq!(decrypted, plaintext);
}

#[test]
fn encrypt_decrypt_empty() {
    let key = generate_random_key();
    let encrypted = encrypt(&key, b"").unwrap();
    let decrypted = decrypt(&key, &encrypted).unwrap();
    assert_eq!(decrypted, b"");
}

#[test]
fn wrong_key_fails_decryption() {
    let key1 = generate_random_key();
    let key2 = generate_random_key();
    let encrypted = encrypt(&key1, b"Secret").unwrap();
    assert!(matches!(
        decrypt(&key2, &encrypted),
        Err(CryptoError::Integrity(_))
    ));
}

#[test]
fn tampered_data_fails_decryption() {
    let key = generate_random_key();
    let mut encrypted = encrypt(&key, b"Secret").unwrap();
    encrypted.ciphertext[0] ^= 0xFF;
    assert!(decrypt(&key, &encrypted).is_err());
}

#[test]
fn same_plaintext_produces_different_ciphertext() {
    let key = generate_random_key();
    let e1 = encrypt(&key, b"Same").unwrap();
    let e2 = encrypt(&key, b"Same").unwrap();
    assert_ne!(e1.nonce, e2.nonce);
    assert_ne!(e1.ciphertext, e2.ciphertext);
}

#[test]
fn ciphertext_carries_tag() {
    let key = generate_random_key();
    let encrypted = encrypt(&key, b"test").unwrap();
    assert_eq!(encrypted.ciphertext.len(), 4 + TAG_SIZE);
    assert_eq!(encrypted.len(), NONCE_SIZE + encrypted.ciphertext.len());
}

// ── EncryptedData ────────────────────────────────────────────────

#[test]
fn bytes_roundtrip() {
    let key = generate_random_key();
    let encrypted = encrypt(&key, b"Data").unwrap();
    let bytes = encrypted.to_bytes();
    assert_eq!(&bytes[..NONCE_SIZE], &encrypted.nonce);
    let decoded = EncryptedData::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, encrypted);
}

#[test]
fn shorter_than_nonce_is_integrity_error() {
    let result = EncryptedData::from_bytes(&[0u8; NONCE_SIZE - 1]);
    assert!(matches!(result, Err(CryptoError::Integrity(_))));
}

#[test]
fn nonce_only_buffer_fails_authentication() {
    let key = generate_random_key();
    let encrypted = EncryptedData::from_bytes(&[0u8; NONCE_SIZE]).unwrap();
    assert!(encrypted.is_empty());
    assert!(matches!(
        decrypt(&key, &encrypted),
        Err(CryptoError::Integrity(_))
    ));
}

// ── Records ──────────────────────────────────────────────────────

#[test]
fn record_roundtrip() {
    let key = generate_random_key();
    let bytes = encrypt_record(&key, &sample()).unwrap();
    let decoded: Record = decrypt_record(&key, &bytes).unwrap();
    assert_eq!(decoded, sample());
}

#[test]
fn record_plaintext_is_canonical_bytes() {
    let key = generate_random_key();
    let bytes = encrypt_record(&key, &sample()).unwrap();
    assert_eq!(
        decrypt_bytes(&key, &bytes).unwrap(),
        hwbind_crypto::to_canonical_bytes(&sample()).unwrap()
    );
}

#[test]
fn record_wrong_key_is_integrity_error() {
    let bytes = encrypt_record(&generate_random_key(), &sample()).unwrap();
    let result: Result<Record, _> = decrypt_record(&generate_random_key(), &bytes);
    assert!(matches!(result, Err(CryptoError::Integrity(_))));
}

#[test]
fn record_type_mismatch_is_serialization_error() {
    let key = generate_random_key();
    let bytes = encrypt_record(&key, &"just a string").unwrap();
    let result: Result<Record, _> = decrypt_record(&key, &bytes);
    assert!(matches!(result, Err(CryptoError::Serialization(_))));
}

#[test]
fn truncated_record_is_integrity_error() {
    let key = generate_random_key();
    let bytes = encrypt_record(&key, &sample()).unwrap();
    let result: Result<Record, _> = decrypt_record(&key, &bytes[..5]);
    assert!(matches!(result, Err(CryptoError::Integrity(_))));
}
