//! Hex rendering of opaque byte sequences

use ::hex::FromHexError;

/// Encodes bytes as lowercase hex, two digits per byte, no separators.
pub fn to_hex(bytes: &[u8]) -> String {
    ::hex::encode(bytes)
}

/// Decodes a hex string produced by [`to_hex`].
pub fn from_hex(encoded: &str) -> Result<Vec<u8>, FromHexError> {
    ::hex::decode(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_known_bytes() {
        assert_eq!(to_hex(&[0x00, 0xAB, 0xFF]), "00abff");
        assert_eq!(to_hex(&[]), "");
        assert_eq!(to_hex(&[0x0f]), "0f");
    }

    #[test]
    fn output_is_lowercase_and_twice_as_long() {
        let bytes: Vec<u8> = (0..=255).collect();
        let encoded = to_hex(&bytes);
        assert_eq!(encoded.len(), bytes.len() * 2);
        assert!(
            encoded
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn decode_inverts_encode() {
        let bytes: Vec<u8> = (0..=255).rev().collect();
        let decoded = from_hex(&to_hex(&bytes)).expect("valid hex");
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn decode_rejects_odd_length() {
        assert!(from_hex("abc").is_err());
    }
}
