//! Encoding records to ISO 2709 bytes.
//!
//! [`build_record`] and [`encode`] produce the bytes of one record; outputs can
//! be concatenated directly into a multi-record stream, which is what
//! [`StreamEncoder`] does.
//!
//! Encoding is fail-hard: a field that cannot be represented in the fixed-width
//! directory, or whose text contains a structural byte, aborts the record.
//!
//! # Examples
//!
//! ```
//! use marcwire::{build_record, ControlField, DataField, Field};
//!
//! let fields: Vec<Field> = vec![
//!     ControlField::new("001", "12345").into(),
//!     DataField::builder("245", '1', '0')
//!         .subfield('a', "Test title")
//!         .build()
//!         .into(),
//! ];
//!
//! let bytes = build_record(&fields)?;
//! assert_eq!(&bytes[..5], format!("{:05}", bytes.len()).as_bytes());
//! # Ok::<(), marcwire::MarcError>(())
//! ```

use crate::directory::DirectoryEntry;
use crate::error::{MarcError, Result};
use crate::leader::{Leader, LEADER_LEN};
use crate::record::{Field, Record, Subfield, Tag};
use crate::{FIELD_TERMINATOR, RECORD_TERMINATOR, SUBFIELD_DELIMITER};
use bytes::{Bytes, BytesMut};

/// Largest field length, terminator included, that fits four digits.
pub const MAX_FIELD_LENGTH: usize = 9_999;

/// Largest field start offset that fits five digits.
pub const MAX_FIELD_OFFSET: usize = 99_999;

/// Reject text carrying any of the three structural bytes.
fn check_text(text: &str, what: &str) -> Result<()> {
    let bytes = text.as_bytes();
    match memchr::memchr3(SUBFIELD_DELIMITER, FIELD_TERMINATOR, RECORD_TERMINATOR, bytes) {
        Some(pos) => Err(MarcError::InvalidField(format!(
            "{what} contains structural byte {:#04x} at {pos}",
            bytes[pos]
        ))),
        None => Ok(()),
    }
}

/// Indicators are written as one byte each, the way the decoder reads them.
fn indicator_byte(indicator: char, tag: &Tag) -> Result<u8> {
    match u8::try_from(indicator) {
        Ok(byte) if !crate::is_structural(byte) => Ok(byte),
        _ => Err(MarcError::InvalidField(format!(
            "field {tag}: indicator {indicator:?} does not fit a single byte"
        ))),
    }
}

/// Encode the content of a control field: its text and a field terminator.
///
/// # Errors
///
/// Returns [`MarcError::InvalidField`] if `tag` is not a control tag or the
/// text contains a structural byte.
pub fn build_control_field(tag: &Tag, text: &str) -> Result<Vec<u8>> {
    tag.to_wire()?;
    if !tag.is_control() {
        return Err(MarcError::InvalidField(format!(
            "tag {tag} is a data tag and cannot hold a control field"
        )));
    }
    check_text(text, &format!("field {tag}"))?;

    let mut content = Vec::with_capacity(text.len() + 1);
    content.extend_from_slice(text.as_bytes());
    content.push(FIELD_TERMINATOR);
    Ok(content)
}

/// Encode the content of a data field: indicators, each subfield as
/// delimiter + code + data, and a field terminator.
///
/// # Errors
///
/// Returns [`MarcError::InvalidField`] if `tag` is a control tag, an indicator
/// does not fit one byte, or a code or value contains a structural byte.
pub fn build_data_field(
    tag: &Tag,
    indicator1: char,
    indicator2: char,
    subfields: &[Subfield],
) -> Result<Vec<u8>> {
    tag.to_wire()?;
    if tag.is_control() {
        return Err(MarcError::InvalidField(format!(
            "tag {tag} is a control tag and cannot hold indicators or subfields"
        )));
    }

    let mut content = Vec::with_capacity(
        3 + subfields
            .iter()
            .map(|sf| 1 + sf.code.len_utf8() + sf.value.len())
            .sum::<usize>(),
    );
    content.push(indicator_byte(indicator1, tag)?);
    content.push(indicator_byte(indicator2, tag)?);

    let mut code_buf = [0u8; 4];
    for subfield in subfields {
        let code = subfield.code.encode_utf8(&mut code_buf);
        check_text(code, &format!("field {tag} subfield code"))?;
        check_text(&subfield.value, &format!("field {tag} subfield ${code}"))?;

        content.push(SUBFIELD_DELIMITER);
        content.extend_from_slice(code.as_bytes());
        content.extend_from_slice(subfield.value.as_bytes());
    }

    content.push(FIELD_TERMINATOR);
    Ok(content)
}

/// Encode the content of any field.
///
/// # Errors
///
/// See [`build_control_field`] and [`build_data_field`].
pub fn build_field(field: &Field) -> Result<Vec<u8>> {
    match field {
        Field::Control(field) => build_control_field(&field.tag, &field.text),
        Field::Data(field) => build_data_field(
            &field.tag,
            field.indicator1,
            field.indicator2,
            &field.subfields,
        ),
    }
}

/// Encode `fields` as one record using the default leader template.
///
/// # Errors
///
/// - [`MarcError::FieldWidthOverflow`] if a field is 10,000 bytes or longer,
///   a field would start at offset 100,000 or beyond, or the record is
///   100,000 bytes or longer
/// - [`MarcError::InvalidField`] for a field that cannot be represented
pub fn build_record(fields: &[Field]) -> Result<Vec<u8>> {
    encode_with_leader(&Leader::default(), fields)
}

/// Encode a record, taking every leader position except the record length
/// and base address from `record.leader`.
///
/// # Errors
///
/// See [`build_record`]; also [`MarcError::MalformedLeader`] if a leader
/// position does not fit in one byte.
pub fn encode(record: &Record) -> Result<Vec<u8>> {
    encode_with_leader(&record.leader, &record.fields)
}

/// Encode several records into one concatenated stream.
///
/// # Errors
///
/// Fails on the first record that cannot be encoded.
pub fn encode_all<'a>(records: impl IntoIterator<Item = &'a Record>) -> Result<Vec<u8>> {
    let mut stream = StreamEncoder::new();
    for record in records {
        stream.push(record)?;
    }
    Ok(stream.finish().to_vec())
}

fn encode_with_leader(template: &Leader, fields: &[Field]) -> Result<Vec<u8>> {
    let mut directory = Vec::with_capacity(fields.len() * 12 + 1);
    let mut data = Vec::new();

    for field in fields {
        let content = build_field(field)?;
        let tag = field.tag();
        if content.len() > MAX_FIELD_LENGTH {
            return Err(MarcError::FieldWidthOverflow(format!(
                "field {tag} is {} bytes; at most {MAX_FIELD_LENGTH} fit the directory",
                content.len()
            )));
        }
        if data.len() > MAX_FIELD_OFFSET {
            return Err(MarcError::FieldWidthOverflow(format!(
                "field {tag} would start at offset {}; the limit is {MAX_FIELD_OFFSET}",
                data.len()
            )));
        }

        DirectoryEntry {
            tag: tag.clone(),
            length: content.len(),
            start: data.len(),
        }
        .write_to(&mut directory)?;
        data.extend_from_slice(&content);
    }
    directory.push(FIELD_TERMINATOR);

    let base_address = LEADER_LEN + directory.len();
    let record_length = base_address + data.len() + 1;
    let leader = Leader {
        record_length,
        data_base_address: base_address,
        ..template.clone()
    };

    let mut bytes = Vec::with_capacity(record_length);
    bytes.extend_from_slice(&leader.to_bytes()?);
    bytes.extend_from_slice(&directory);
    bytes.extend_from_slice(&data);
    bytes.push(RECORD_TERMINATOR);
    Ok(bytes)
}

/// Accumulates encoded records into one stream buffer.
///
/// A record that fails to encode leaves the stream unchanged, so callers may
/// skip it and continue.
///
/// # Examples
///
/// ```
/// use marcwire::{decode, Record, StreamEncoder};
///
/// let mut stream = StreamEncoder::new();
/// for id in ["a1", "a2", "a3"] {
///     let mut record = Record::default();
///     record.add_control_field("001", id);
///     stream.push(&record)?;
/// }
/// assert_eq!(stream.records_written(), 3);
///
/// let bytes = stream.finish();
/// assert_eq!(decode(&bytes).len(), 3);
/// # Ok::<(), marcwire::MarcError>(())
/// ```
#[derive(Debug, Default)]
pub struct StreamEncoder {
    buffer: BytesMut,
    records_written: usize,
}

impl StreamEncoder {
    /// Create an empty stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty stream with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        StreamEncoder {
            buffer: BytesMut::with_capacity(capacity),
            records_written: 0,
        }
    }

    /// Encode and append a record.
    ///
    /// # Errors
    ///
    /// See [`encode`].
    pub fn push(&mut self, record: &Record) -> Result<()> {
        let bytes = encode(record)?;
        self.append(&bytes);
        Ok(())
    }

    /// Encode and append a record built from `fields` with the default leader.
    ///
    /// # Errors
    ///
    /// See [`build_record`].
    pub fn push_fields(&mut self, fields: &[Field]) -> Result<()> {
        let bytes = build_record(fields)?;
        self.append(&bytes);
        Ok(())
    }

    fn append(&mut self, record: &[u8]) {
        self.buffer.extend_from_slice(record);
        self.records_written += 1;
    }

    /// Returns the number of records written so far.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Length of the stream in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Finish the stream.
    #[must_use]
    pub fn finish(self) -> Bytes {
        self.buffer.freeze()
    }
}
