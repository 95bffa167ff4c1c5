//! MARC record leader parsing and serialization.
//!
//! The MARC leader is a 24-byte fixed-length header at the start of every record.
//! Only two of its values are structural for the codec; every other position is
//! carried through verbatim so that records round-trip byte for byte.
//!
//! # Structure
//!
//! - Positions 0-4: Record length (5 digits)
//! - Position 5: Record status
//! - Position 6: Record type
//! - Position 7: Bibliographic level
//! - Position 8: Control record type
//! - Position 9: Character coding (space = MARC-8, a = UTF-8)
//! - Position 10: Indicator count (usually 2)
//! - Position 11: Subfield code count (usually 2)
//! - Positions 12-16: Base address of data (5 digits)
//! - Positions 17-19: Encoding level, cataloging form, multipart level
//! - Positions 20-23: Entry map (usually "4500")

use crate::directory::{parse_digits, push_padded};
use crate::error::{MarcError, Result};
use serde::{Deserialize, Serialize};

/// Length of the leader in bytes.
pub const LEADER_LEN: usize = 24;

/// Width of the leader's record length and base address fields.
pub(crate) const LENGTH_WIDTH: usize = 5;

/// MARC Leader - 24 bytes at the start of every MARC record.
///
/// Positions other than the record length and base address are stored as
/// single-byte characters and are never interpreted by the codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leader {
    /// Record length (5 digits) - positions 0-4
    pub record_length: usize,
    /// Record status (1 char) - position 5
    pub record_status: char,
    /// Type of record (1 char) - position 6
    pub record_type: char,
    /// Bibliographic level (1 char) - position 7
    pub bibliographic_level: char,
    /// Type of control record (1 char) - position 8
    pub control_record_type: char,
    /// Character coding scheme (1 char) - position 9
    pub character_coding: char,
    /// Indicator count (1 char) - position 10
    pub indicator_count: char,
    /// Subfield code count (1 char) - position 11
    pub subfield_code_count: char,
    /// Base address of data (5 digits) - positions 12-16
    pub data_base_address: usize,
    /// Encoding level (1 char) - position 17
    pub encoding_level: char,
    /// Cataloging form (1 char) - position 18
    pub cataloging_form: char,
    /// Multipart resource record level (1 char) - position 19
    pub multipart_level: char,
    /// Entry map (4 chars) - positions 20-23
    pub entry_map: String,
}

impl Default for Leader {
    /// The encoder template: `nam a22` + base address + `   4500`, UTF-8 coded.
    fn default() -> Self {
        Leader {
            record_length: 0,
            record_status: 'n',
            record_type: 'a',
            bibliographic_level: 'm',
            control_record_type: ' ',
            character_coding: 'a',
            indicator_count: '2',
            subfield_code_count: '2',
            data_base_address: 0,
            encoding_level: ' ',
            cataloging_form: ' ',
            multipart_level: ' ',
            entry_map: "4500".to_string(),
        }
    }
}

impl Leader {
    /// Read only the declared record length from the first five bytes.
    ///
    /// This is what stream framing relies on; nothing else in the leader needs
    /// to be valid for a record to be located.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::MalformedLeader`] if fewer than five bytes are given,
    /// the bytes are not ASCII digits, or the declared length is zero.
    pub fn declared_length(bytes: &[u8]) -> Result<usize> {
        let digits = bytes.get(..LENGTH_WIDTH).ok_or_else(|| {
            MarcError::MalformedLeader(format!(
                "need {LENGTH_WIDTH} bytes for record length, got {}",
                bytes.len()
            ))
        })?;
        match parse_digits(digits) {
            Some(0) => Err(MarcError::MalformedLeader(
                "record length must be positive".to_string(),
            )),
            Some(length) => Ok(length),
            None => Err(MarcError::MalformedLeader(format!(
                "non-numeric record length '{}'",
                String::from_utf8_lossy(digits)
            ))),
        }
    }

    /// Parse a leader from the first 24 bytes of a record.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::MalformedLeader`] if fewer than 24 bytes are given or
    /// either numeric field is not made of ASCII digits.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < LEADER_LEN {
            return Err(MarcError::MalformedLeader(format!(
                "Leader must be at least {LEADER_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        let record_length = parse_digits(&bytes[0..5]).ok_or_else(|| {
            MarcError::MalformedLeader(format!(
                "non-numeric record length '{}'",
                String::from_utf8_lossy(&bytes[0..5])
            ))
        })?;
        let data_base_address = parse_digits(&bytes[12..17]).ok_or_else(|| {
            MarcError::MalformedLeader(format!(
                "non-numeric base address '{}'",
                String::from_utf8_lossy(&bytes[12..17])
            ))
        })?;

        Ok(Leader {
            record_length,
            record_status: char::from(bytes[5]),
            record_type: char::from(bytes[6]),
            bibliographic_level: char::from(bytes[7]),
            control_record_type: char::from(bytes[8]),
            character_coding: char::from(bytes[9]),
            indicator_count: char::from(bytes[10]),
            subfield_code_count: char::from(bytes[11]),
            data_base_address,
            encoding_level: char::from(bytes[17]),
            cataloging_form: char::from(bytes[18]),
            multipart_level: char::from(bytes[19]),
            entry_map: bytes[20..24].iter().copied().map(char::from).collect(),
        })
    }

    /// Validate that the leader describes a record of `available` bytes that
    /// can be safely sliced.
    ///
    /// The base address must leave room for at least the directory terminator
    /// and must not point past the end of the record.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::MalformedLeader`] on an unusable length or base address.
    pub fn validate_for_reading(&self, available: usize) -> Result<()> {
        if self.record_length < LEADER_LEN {
            return Err(MarcError::MalformedLeader(format!(
                "Record length must be at least {LEADER_LEN}, got {}",
                self.record_length
            )));
        }
        if self.record_length != available {
            return Err(MarcError::MalformedLeader(format!(
                "Record length {} does not match the {available} bytes supplied",
                self.record_length
            )));
        }
        if self.data_base_address <= LEADER_LEN || self.data_base_address > self.record_length {
            return Err(MarcError::MalformedLeader(format!(
                "Base address of data {} outside record of length {}",
                self.data_base_address, self.record_length
            )));
        }
        Ok(())
    }

    /// Whether the leader declares UTF-8 (`a` at position 9).
    #[must_use]
    pub fn is_unicode(&self) -> bool {
        self.character_coding == 'a'
    }

    /// Serialize the leader to its 24-byte wire form.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::FieldWidthOverflow`] if the record length or base
    /// address needs more than five digits, and [`MarcError::MalformedLeader`] if
    /// a template position does not fit in one byte or the entry map is not
    /// four characters long.
    pub fn to_bytes(&self) -> Result<[u8; LEADER_LEN]> {
        let mut bytes = Vec::with_capacity(LEADER_LEN);

        push_padded(&mut bytes, self.record_length, LENGTH_WIDTH, "record length")?;
        for c in [
            self.record_status,
            self.record_type,
            self.bibliographic_level,
            self.control_record_type,
            self.character_coding,
            self.indicator_count,
            self.subfield_code_count,
        ] {
            bytes.push(template_byte(c)?);
        }
        push_padded(&mut bytes, self.data_base_address, LENGTH_WIDTH, "base address")?;
        for c in [self.encoding_level, self.cataloging_form, self.multipart_level] {
            bytes.push(template_byte(c)?);
        }

        if self.entry_map.chars().count() != 4 {
            return Err(MarcError::MalformedLeader(format!(
                "Entry map must be 4 characters, got '{}'",
                self.entry_map
            )));
        }
        for c in self.entry_map.chars() {
            bytes.push(template_byte(c)?);
        }

        bytes.try_into().map_err(|v: Vec<u8>| {
            MarcError::MalformedLeader(format!("leader serialized to {} bytes", v.len()))
        })
    }
}

/// Leader positions hold exactly one byte; chars above U+00FF cannot be written.
fn template_byte(c: char) -> Result<u8> {
    u8::try_from(u32::from(c)).map_err(|_| {
        MarcError::MalformedLeader(format!("leader position cannot hold '{c}'"))
    })
}
