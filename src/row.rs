//! Borrowed view of the current row and typed access to its values.

use std::collections::BTreeSet;

use crate::conversion::{FromField, Temporal, decode_bit, decode_set, decode_temporal};
use crate::error::{Error, Result};
use crate::field::Field;
use crate::raw::RawResult;

/// The current row of a held result.
///
/// Borrows the result, so it cannot outlive the next fetch, seek or free.
pub struct Row<'a, R> {
    result: &'a R,
}

impl<'a, R: RawResult> Row<'a, R> {
    pub(crate) fn new(result: &'a R) -> Self {
        Self { result }
    }

    pub fn fields(&self) -> &'a [Field] {
        self.result.fields()
    }

    pub fn len(&self) -> usize {
        self.fields().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Column metadata at `index`.
    pub fn field(&self, index: usize) -> Result<&'a Field> {
        let fields = self.fields();
        fields.get(index).ok_or(Error::FieldIndex {
            index,
            field_count: fields.len(),
        })
    }

    /// Raw value at `index`; `None` for SQL NULL.
    pub fn value(&self, index: usize) -> Result<Option<&'a [u8]>> {
        self.field(index)?;
        Ok(self.result.value(index))
    }

    /// Raw bytes at `index`. NULL is an error.
    pub fn bytes(&self, index: usize) -> Result<&'a [u8]> {
        self.value(index)?.ok_or(Error::UnexpectedNull(index))
    }

    /// Length of the value at `index` in bytes (0 for NULL).
    pub fn length(&self, index: usize) -> Result<usize> {
        Ok(self.value(index)?.map_or(0, <[u8]>::len))
    }

    pub fn is_null(&self, index: usize) -> Result<bool> {
        Ok(self.value(index)?.is_none())
    }

    /// Decode the value at `index`.
    pub fn get<T: FromField<'a>>(&self, index: usize) -> Result<T> {
        let field = self.field(index)?;
        match self.result.value(index) {
            None => T::from_null(index, field),
            Some(bytes) => T::from_field(index, field, bytes),
        }
    }

    pub fn str(&self, index: usize) -> Result<&'a str> {
        self.get(index)
    }

    /// BIT column as an unsigned integer.
    pub fn bit(&self, index: usize) -> Result<u64> {
        let field = self.field(index)?;
        decode_bit(index, field, self.bytes(index)?)
    }

    /// SET column as its member names.
    pub fn set(&self, index: usize) -> Result<BTreeSet<String>> {
        let field = self.field(index)?;
        decode_set(index, field, self.bytes(index)?)
    }

    /// Temporal column, parsed by its declared type.
    pub fn temporal(&self, index: usize) -> Result<Temporal> {
        let field = self.field(index)?;
        decode_temporal(index, field, self.bytes(index)?)
    }

    /// Decode the whole row, e.g. into a tuple.
    pub fn decode<T: FromRow<'a>>(&self) -> Result<T> {
        T::from_row(self)
    }
}

/// Trait for decoding a row into a Rust type.
pub trait FromRow<'a>: Sized {
    fn from_row<R: RawResult>(row: &Row<'a, R>) -> Result<Self>;
}

macro_rules! impl_from_row {
    ($count:expr, $($idx:tt: $T:ident),+) => {
        impl<'a, $($T: FromField<'a>),+> FromRow<'a> for ($($T,)+) {
            fn from_row<R: RawResult>(row: &Row<'a, R>) -> Result<Self> {
                if row.len() < $count {
                    return Err(Error::Decode(format!(
                        "not enough columns for tuple: {} < {}",
                        row.len(),
                        $count
                    )));
                }
                Ok(($(row.get::<$T>($idx)?,)+))
            }
        }
    };
}

impl_from_row!(1, 0: T0);
impl_from_row!(2, 0: T0, 1: T1);
impl_from_row!(3, 0: T0, 1: T1, 2: T2);
impl_from_row!(4, 0: T0, 1: T1, 2: T2, 3: T3);
impl_from_row!(5, 0: T0, 1: T1, 2: T2, 3: T3, 4: T4);
impl_from_row!(6, 0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5);
impl_from_row!(7, 0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5, 6: T6);
impl_from_row!(8, 0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5, 6: T6, 7: T7);
