//! BIT column decoding.

use crate::error::{Error, Result};
use crate::field::{Field, FieldType};

/// Decode a BIT value rendered as a big-endian string of ASCII `'0'`/`'1'`.
///
/// `"101"` decodes to `5`. At most 64 digits are accepted.
pub fn decode_bit(index: usize, field: &Field, bytes: &[u8]) -> Result<u64> {
    if field.field_type != FieldType::Bit {
        return Err(Error::type_mismatch(index, "bit", field.field_type));
    }
    if bytes.len() > 64 {
        return Err(Error::Decode(format!(
            "bit value of {} digits does not fit in u64",
            bytes.len()
        )));
    }

    bytes.iter().try_fold(0u64, |acc, &digit| match digit {
        b'0' => Ok(acc << 1),
        b'1' => Ok((acc << 1) | 1),
        _ => Err(Error::Decode(format!(
            "invalid bit digit: {:?}",
            char::from(digit)
        ))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bit() -> Field {
        Field::new("flags", FieldType::Bit)
    }

    #[test]
    fn test_decode_bit() {
        assert_eq!(decode_bit(0, &bit(), b"101").unwrap(), 5);
        assert_eq!(decode_bit(0, &bit(), b"0").unwrap(), 0);
        assert_eq!(decode_bit(0, &bit(), b"").unwrap(), 0);
        assert_eq!(decode_bit(0, &bit(), &[b'1'; 64]).unwrap(), u64::MAX);
    }

    #[test]
    fn test_decode_bit_errors() {
        assert!(matches!(
            decode_bit(0, &bit(), &[b'1'; 65]),
            Err(Error::Decode(_))
        ));
        assert!(matches!(
            decode_bit(0, &bit(), b"1\x002"),
            Err(Error::Decode(_))
        ));
        assert!(matches!(
            decode_bit(1, &Field::new("n", FieldType::Long), b"101"),
            Err(Error::TypeMismatch { index: 1, .. })
        ));
    }
}
