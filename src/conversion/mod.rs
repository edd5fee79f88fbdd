//! Decoding of text-protocol field values.
//!
//! Every value arrives as the server's text rendering together with the
//! column's [`Field`] metadata. The declared type is checked before parsing,
//! so reading a `VARCHAR` as an integer is a type mismatch even when the
//! text happens to be numeric.

mod bit;
mod bytes;
mod primitives;
mod set;
mod string;
mod temporal;

pub use bit::decode_bit;
pub use set::decode_set;
pub use temporal::{Temporal, decode_temporal};

use crate::error::{Error, Result};
use crate::field::Field;

/// Trait for decoding a column value into a Rust type.
pub trait FromField<'a>: Sized {
    /// Decode from SQL NULL.
    ///
    /// Default implementation returns an error. Override for types that can
    /// represent NULL (like `Option<T>`).
    fn from_null(index: usize, field: &Field) -> Result<Self> {
        let _ = field;
        Err(Error::UnexpectedNull(index))
    }

    /// Decode from the value's bytes. `index` is only used for error messages.
    fn from_field(index: usize, field: &Field, bytes: &'a [u8]) -> Result<Self>;
}

impl<'a, T: FromField<'a>> FromField<'a> for Option<T> {
    fn from_null(_index: usize, _field: &Field) -> Result<Self> {
        Ok(None)
    }

    fn from_field(index: usize, field: &Field, bytes: &'a [u8]) -> Result<Self> {
        T::from_field(index, field, bytes).map(Some)
    }
}

/// Validate UTF-8 field text.
pub(crate) fn utf8(bytes: &[u8]) -> Result<&str> {
    simdutf8::compat::from_utf8(bytes).map_err(|e| Error::Decode(format!("invalid UTF-8: {}", e)))
}
