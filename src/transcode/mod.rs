//! Printable transcoding of binary audio for embedding inside JSON payloads.
//!
//! Encoding is standard padded base64. Decoding is lenient: it stops at the
//! first character outside the base64 alphabet (padding included) and returns
//! whatever decoded cleanly up to that point. Use [`is_valid_base64`] when a
//! strict check is needed.

use base64::{
    alphabet,
    engine::{
        general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD},
        DecodePaddingMode,
    },
    Engine as _,
};

const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone),
);

/// Encode raw bytes as padded base64. Total over every input, including empty.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode base64 text, truncating at the first non-alphabet character.
pub fn decode(text: &str) -> Vec<u8> {
    let end = text
        .find(|c: char| !is_alphabet_char(c))
        .unwrap_or(text.len());
    let mut prefix = &text[..end];
    // A single dangling symbol carries fewer than eight bits.
    if prefix.len() % 4 == 1 {
        prefix = &prefix[..prefix.len() - 1];
    }
    match LENIENT.decode(prefix) {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!(%error, "base64 prefix failed to decode");
            Vec::new()
        }
    }
}

/// Strict validity check: non-empty, length a multiple of four, alphabet
/// characters only, with `=` allowed in the final two positions.
pub fn is_valid_base64(text: &str) -> bool {
    let len = text.len();
    if len == 0 || len % 4 != 0 {
        return false;
    }
    text.char_indices().all(|(index, c)| {
        is_alphabet_char(c) || (c == '=' && index >= len - 2)
    })
}

fn is_alphabet_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '+' || c == '/'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_standard_vectors() {
        assert_eq!(encode(b""), "");
        assert_eq!(encode(b"f"), "Zg==");
        assert_eq!(encode(b"fo"), "Zm8=");
        assert_eq!(encode(b"foo"), "Zm9v");
        assert_eq!(encode(b"foobar"), "Zm9vYmFy");
    }

    #[test]
    fn round_trips_every_tail_length_and_byte_value() {
        let all_bytes: Vec<u8> = (0..=255).collect();
        for len in 0..all_bytes.len() {
            let slice = &all_bytes[..len];
            assert_eq!(decode(&encode(slice)), slice, "length {len}");
        }
    }

    #[test]
    fn decode_stops_at_first_foreign_character() {
        assert_eq!(decode("Zm9v!Ymfy"), b"foo");
        assert_eq!(decode("Zm9vYmFy\n"), b"foobar");
        assert_eq!(decode("Zg=="), b"f");
        assert_eq!(decode("Zm9vYg"), b"foob");
    }

    #[test]
    fn decode_drops_a_dangling_symbol() {
        assert_eq!(decode("Zm9vY"), b"foo");
        assert_eq!(decode("Z"), b"");
        assert!(decode("").is_empty());
        assert!(decode("***").is_empty());
    }

    #[test]
    fn validity_requires_length_multiple_of_four() {
        assert!(is_valid_base64("Zm9v"));
        assert!(is_valid_base64("Zg=="));
        assert!(is_valid_base64("Zm8="));
        assert!(!is_valid_base64(""));
        assert!(!is_valid_base64("Zm9"));
        assert!(!is_valid_base64("Zm9vY"));
    }

    #[test]
    fn validity_rejects_foreign_characters_and_early_padding() {
        assert!(!is_valid_base64("Zm-v"));
        assert!(!is_valid_base64("Zm 9"));
        assert!(!is_valid_base64("=m9v"));
        assert!(!is_valid_base64("Z=9vYmFy"));
    }
}
