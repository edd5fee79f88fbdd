//! Byte type implementations (`&[u8]`, `Vec<u8>`).
//!
//! The text protocol sends BLOB and BINARY columns as raw bytes, embedded
//! zeros included, so no unescaping is needed.

use crate::error::Result;
use crate::field::Field;

use super::FromField;

impl<'a> FromField<'a> for &'a [u8] {
    fn from_field(_index: usize, _field: &Field, bytes: &'a [u8]) -> Result<Self> {
        Ok(bytes)
    }
}

impl FromField<'_> for Vec<u8> {
    fn from_field(_index: usize, _field: &Field, bytes: &[u8]) -> Result<Self> {
        Ok(bytes.to_vec())
    }
}
