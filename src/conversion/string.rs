//! String type implementations (&str, String).
//!
//! Every column has a text rendering, so strings accept any declared type.

use crate::error::Result;
use crate::field::Field;

use super::{FromField, utf8};

impl<'a> FromField<'a> for &'a str {
    fn from_field(_index: usize, _field: &Field, bytes: &'a [u8]) -> Result<Self> {
        utf8(bytes)
    }
}

impl FromField<'_> for String {
    fn from_field(_index: usize, _field: &Field, bytes: &[u8]) -> Result<Self> {
        utf8(bytes).map(|s| s.to_owned())
    }
}
