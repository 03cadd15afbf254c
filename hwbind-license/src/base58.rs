//! Base-58 with the Bitcoin alphabet.
//!
//! Each leading zero byte maps to one leading `'1'` and back, so arbitrary
//! binary payloads round-trip exactly.

use crate::error::{LicenseError, LicenseResult};

/// The Bitcoin alphabet (no `0`, `O`, `I`, `l`).
pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const INVALID: u8 = 0xFF;

const fn decode_table() -> [u8; 128] {
    let mut table = [INVALID; 128];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
}

const DECODE: [u8; 128] = decode_table();

/// Encodes bytes as base-58.
#[must_use]
pub fn encode(input: &[u8]) -> String {
    let zeros = input.iter().take_while(|&&b| b == 0).count();

    // Base-58 digits, least significant first.
    let mut digits: Vec<u8> = Vec::with_capacity((input.len() - zeros) * 138 / 100 + 1);
    for &byte in &input[zeros..] {
        let mut carry = u32::from(byte);
        for digit in &mut digits {
            carry += u32::from(*digit) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let mut out = String::with_capacity(zeros + digits.len());
    out.extend(std::iter::repeat_n('1', zeros));
    out.extend(digits.iter().rev().map(|&d| ALPHABET[d as usize] as char));
    out
}

/// Decodes base-58 text.
///
/// # Errors
///
/// Returns [`LicenseError::Encoding`] on a character outside the alphabet.
pub fn decode(input: &str) -> LicenseResult<Vec<u8>> {
    let zeros = input.bytes().take_while(|&c| c == b'1').count();

    // Base-256 bytes, least significant first.
    let mut bytes: Vec<u8> = Vec::with_capacity(input.len() * 733 / 1000 + 1);
    for (position, ch) in input.chars().enumerate().skip(zeros) {
        let value = if ch.is_ascii() {
            DECODE[ch as usize]
        } else {
            INVALID
        };
        if value == INVALID {
            return Err(LicenseError::Encoding(format!(
                "invalid base-58 character {ch:?} at position {position}"
            )));
        }

        let mut carry = u32::from(value);
        for byte in &mut bytes {
            carry += u32::from(*byte) * 58;
            *byte = (carry & 0xFF) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xFF) as u8);
            carry >>= 8;
        }
    }

    let mut out = vec![0u8; zeros];
    out.extend(bytes.iter().rev());
    Ok(out)
}
