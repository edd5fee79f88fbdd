//! The held result set and its row cursor.

use crate::error::{Error, Result};
use crate::field::Field;
use crate::raw::RawResult;
use crate::row::Row;
use crate::state::Fetched;

/// How the rows of a result are held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultMode {
    /// Every row was transferred by `store_result`.
    Buffered,
    /// Rows are read from the server one fetch at a time (`use_result`).
    Streaming,
}

/// A result set owned by a connection, with its row cursor.
#[derive(Debug)]
pub struct ResultCursor<R> {
    raw: R,
    mode: ResultMode,
    has_row: bool,
    exhausted: bool,
}

impl<R: RawResult> ResultCursor<R> {
    pub(crate) fn new(raw: R, mode: ResultMode) -> Self {
        Self {
            raw,
            mode,
            has_row: false,
            exhausted: false,
        }
    }

    pub fn mode(&self) -> ResultMode {
        self.mode
    }

    /// Whether the last fetch produced a row.
    pub fn have_row(&self) -> bool {
        self.has_row
    }

    /// Whether the cursor has reported the end of its rows.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn fields(&self) -> &[Field] {
        self.raw.fields()
    }

    pub fn field_count(&self) -> usize {
        self.raw.fields().len()
    }

    pub fn field(&self, index: usize) -> Result<&Field> {
        let fields = self.raw.fields();
        fields.get(index).ok_or(Error::FieldIndex {
            index,
            field_count: fields.len(),
        })
    }

    /// Rows in the result. Streaming results don't know their size.
    pub fn row_count(&self) -> Result<u64> {
        match self.mode {
            ResultMode::Buffered => Ok(self.raw.num_rows()),
            ResultMode::Streaming => Err(Error::NotBuffered),
        }
    }

    /// Position the cursor so the next fetch returns row `row`.
    pub fn seek_row(&mut self, row: u64) -> Result<()> {
        let row_count = self.row_count()?;
        if row >= row_count {
            return Err(Error::RowOutOfRange { row, row_count });
        }
        self.raw.data_seek(row);
        self.has_row = false;
        self.exhausted = false;
        Ok(())
    }

    /// The current row.
    pub fn row(&self) -> Result<Row<'_, R>> {
        if !self.has_row {
            return Err(Error::NoRow);
        }
        Ok(Row::new(&self.raw))
    }

    /// Fails once the end of rows has been reported.
    pub(crate) fn ensure_fetchable(&self) -> Result<()> {
        if self.exhausted {
            Err(Error::CursorExhausted)
        } else {
            Ok(())
        }
    }

    /// Record the outcome of a fetch.
    pub(crate) fn fetched(&mut self, has_row: bool) -> Fetched {
        self.has_row = has_row;
        if has_row {
            Fetched::Row
        } else {
            self.exhausted = true;
            Fetched::EndOfResults
        }
    }

    /// The current row is unusable while the library works on the result.
    pub(crate) fn invalidate_row(&mut self) {
        self.has_row = false;
    }

    pub(crate) fn raw_mut(&mut self) -> &mut R {
        &mut self.raw
    }
}
