//! SET column decoding.

use std::collections::BTreeSet;

use memchr::memchr_iter;

use crate::error::{Error, Result};
use crate::field::Field;

use super::utf8;

/// Decode a SET value: the member names joined by `,`.
///
/// An empty value is the empty set.
pub fn decode_set(index: usize, field: &Field, bytes: &[u8]) -> Result<BTreeSet<String>> {
    if !field.is_set() {
        return Err(Error::type_mismatch(index, "a set", field.field_type));
    }

    let mut members = BTreeSet::new();
    if bytes.is_empty() {
        return Ok(members);
    }

    let mut start = 0;
    for comma in memchr_iter(b',', bytes) {
        members.insert(utf8(&bytes[start..comma])?.to_owned());
        start = comma + 1;
    }
    members.insert(utf8(&bytes[start..])?.to_owned());

    Ok(members)
}
