//! The record directory: fixed-width entries locating each field.
//!
//! Each 12-byte entry is `tag(3) + length(4) + start(5)`, all ASCII. The run of
//! entries starts right after the leader and ends with a field terminator.
//! Numbers are read straight from the raw bytes so that nothing decoded as text
//! elsewhere in the record can shift a fixed offset.

use crate::error::{MarcError, Result};
use crate::leader::LEADER_LEN;
use crate::record::Tag;
use crate::FIELD_TERMINATOR;

/// Length of one directory entry in bytes.
pub const DIRECTORY_ENTRY_LEN: usize = 12;

const LENGTH_DIGITS: usize = 4;
const START_DIGITS: usize = 5;

/// Parse an unsigned decimal made only of ASCII digits.
///
/// Signs, whitespace and empty input are rejected.
pub(crate) fn parse_digits(bytes: &[u8]) -> Option<usize> {
    if bytes.is_empty() {
        return None;
    }
    let mut value = 0usize;
    for &byte in bytes {
        if !byte.is_ascii_digit() {
            return None;
        }
        value = value.checked_mul(10)?.checked_add(usize::from(byte - b'0'))?;
    }
    Some(value)
}

/// Append `value` zero-padded to exactly `width` digits.
///
/// A value that needs more digits is an error rather than being truncated.
pub(crate) fn push_padded(out: &mut Vec<u8>, value: usize, width: usize, what: &str) -> Result<()> {
    let digits = value.to_string();
    if digits.len() > width {
        return Err(MarcError::FieldWidthOverflow(format!(
            "{what} {value} does not fit in {width} digits"
        )));
    }
    out.resize(out.len() + (width - digits.len()), b'0');
    out.extend_from_slice(digits.as_bytes());
    Ok(())
}

/// One directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Field tag
    pub tag: Tag,
    /// Field length in bytes, including its field terminator
    pub length: usize,
    /// Start of the field relative to the base address of data
    pub start: usize,
}

impl DirectoryEntry {
    /// Parse a single 12-byte entry.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::MalformedDirectory`] if the slice is not 12 bytes or
    /// the length/start positions contain anything but ASCII digits.
    pub fn parse(entry: &[u8]) -> Result<Self> {
        if entry.len() != DIRECTORY_ENTRY_LEN {
            return Err(MarcError::MalformedDirectory(format!(
                "directory entry must be {DIRECTORY_ENTRY_LEN} bytes, got {}",
                entry.len()
            )));
        }
        let tag = Tag::from_raw([entry[0], entry[1], entry[2]]);
        let length = parse_digits(&entry[3..7]).ok_or_else(|| {
            MarcError::MalformedDirectory(format!(
                "field {tag}: non-numeric length '{}'",
                String::from_utf8_lossy(&entry[3..7])
            ))
        })?;
        let start = parse_digits(&entry[7..12]).ok_or_else(|| {
            MarcError::MalformedDirectory(format!(
                "field {tag}: non-numeric start '{}'",
                String::from_utf8_lossy(&entry[7..12])
            ))
        })?;
        Ok(DirectoryEntry { tag, length, start })
    }

    /// Append the 12-byte wire form of this entry.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::FieldWidthOverflow`] if the length needs more than
    /// four digits or the start more than five, and [`MarcError::InvalidField`]
    /// if the tag is not three ASCII bytes.
    pub fn write_to(&self, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(&self.tag.to_wire()?);
        push_padded(out, self.length, LENGTH_DIGITS, "field length")?;
        push_padded(out, self.start, START_DIGITS, "field offset")
    }

    /// Offset one past the last byte of the field, relative to the base address.
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Scan the directory of a record whose leader has already been validated.
///
/// Entries are read in 12-byte strides from the end of the leader until a field
/// terminator is found. The terminator must sit before `base_address`.
///
/// # Errors
///
/// Returns [`MarcError::DirectoryOverflow`] if the directory runs into the base
/// address without a terminator, and [`MarcError::MalformedDirectory`] for an
/// entry with non-digit widths.
pub fn parse_directory(record: &[u8], base_address: usize) -> Result<Vec<DirectoryEntry>> {
    let limit = base_address.min(record.len());
    let mut entries = Vec::with_capacity(limit.saturating_sub(LEADER_LEN) / DIRECTORY_ENTRY_LEN);
    let mut pos = LEADER_LEN;

    loop {
        if pos >= limit {
            return Err(MarcError::DirectoryOverflow(format!(
                "no directory terminator before base address {base_address}"
            )));
        }
        if record[pos] == FIELD_TERMINATOR {
            return Ok(entries);
        }
        // The entry and the terminator after it must both precede the data.
        if pos + DIRECTORY_ENTRY_LEN >= limit {
            return Err(MarcError::DirectoryOverflow(format!(
                "partial directory entry at byte {pos} runs into base address {base_address}"
            )));
        }
        entries.push(DirectoryEntry::parse(
            &record[pos..pos + DIRECTORY_ENTRY_LEN],
        )?);
        pos += DIRECTORY_ENTRY_LEN;
    }
}
