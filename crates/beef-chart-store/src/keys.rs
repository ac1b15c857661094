//! Key encoding for key-value backends.
//!
//! Record keys are big-endian ids so that iteration order is id order.

use beef_chart_core::CutId;

/// Key of a record in the table's column family.
#[must_use]
pub fn record_key(id: CutId) -> [u8; 8] {
    id.to_be_bytes()
}

/// Decode a record key.
#[must_use]
pub fn id_from_record_key(key: &[u8]) -> Option<CutId> {
    CutId::from_be_bytes(key)
}

/// Key of a table's id sequence in the meta column family.
#[must_use]
pub fn sequence_key(table: &str) -> Vec<u8> {
    format!("seq:{table}").into_bytes()
}

/// Encode a sequence value.
#[must_use]
pub fn encode_sequence(next_id: u64) -> [u8; 8] {
    next_id.to_be_bytes()
}

/// Decode a sequence value. Missing or malformed values restart at 1.
#[must_use]
pub fn decode_sequence(bytes: Option<&[u8]>) -> u64 {
    bytes
        .and_then(|b| <[u8; 8]>::try_from(b).ok())
        .map_or(1, u64::from_be_bytes)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_key_roundtrip() {
        let id = CutId::new(42).unwrap();
        assert_eq!(id_from_record_key(&record_key(id)), Some(id));
    }

    #[test]
    fn sequence_defaults_to_one() {
        assert_eq!(decode_sequence(None), 1);
        assert_eq!(decode_sequence(Some(&[0; 8])), 1);
        assert_eq!(decode_sequence(Some(&[1, 2])), 1);
        assert_eq!(decode_sequence(Some(&encode_sequence(30))), 30);
    }

    #[test]
    fn sequence_key_is_per_table() {
        assert_ne!(sequence_key("a_beef_chart_data"), sequence_key("b_beef_chart_data"));
    }
}
