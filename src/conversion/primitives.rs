//! Numeric type implementations (integers, floats, bool).

use crate::error::{Error, Result};
use crate::field::Field;

use super::{FromField, utf8};

fn integer_text<'a>(index: usize, field: &Field, bytes: &'a [u8]) -> Result<&'a str> {
    if !field.field_type.is_integer() {
        return Err(Error::type_mismatch(index, "an integer", field.field_type));
    }
    utf8(bytes)
}

macro_rules! impl_integer {
    ($($t:ty),+) => {
        $(
            impl FromField<'_> for $t {
                fn from_field(index: usize, field: &Field, bytes: &[u8]) -> Result<Self> {
                    integer_text(index, field, bytes)?.parse().map_err(|e| {
                        Error::Decode(format!("invalid {}: {}", stringify!($t), e))
                    })
                }
            }
        )+
    };
}

impl_integer!(i8, i16, i32, i64, u8, u16, u32, u64);

impl FromField<'_> for f64 {
    fn from_field(index: usize, field: &Field, bytes: &[u8]) -> Result<Self> {
        if !field.field_type.is_number() {
            return Err(Error::type_mismatch(index, "a number", field.field_type));
        }
        utf8(bytes)?
            .parse()
            .map_err(|e| Error::Decode(format!("invalid f64: {}", e)))
    }
}

impl FromField<'_> for f32 {
    fn from_field(index: usize, field: &Field, bytes: &[u8]) -> Result<Self> {
        if !field.field_type.is_number() {
            return Err(Error::type_mismatch(index, "a number", field.field_type));
        }
        utf8(bytes)?
            .parse()
            .map_err(|e| Error::Decode(format!("invalid f32: {}", e)))
    }
}

/// `BOOL` is `TINYINT(1)`: zero is false, anything else true.
impl FromField<'_> for bool {
    fn from_field(index: usize, field: &Field, bytes: &[u8]) -> Result<Self> {
        let value = i64::from_field(index, field, bytes)?;
        Ok(value != 0)
    }
}
