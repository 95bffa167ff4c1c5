//! Decoding ISO 2709 records from byte buffers.
//!
//! [`decode`] turns a buffer holding one or more concatenated records into a
//! list of [`Record`]s. It is fail-soft: a record that cannot be framed or
//! parsed ends the scan and the records decoded before it are returned.
//! [`Decoder`] exposes the same behaviour with configuration, a lazy iterator
//! and a report of why a scan stopped.
//!
//! # Examples
//!
//! ```
//! use marcwire::{decode, encode, DataField, Record};
//!
//! let mut record = Record::default();
//! record.add_control_field("001", "ocm00001");
//! record.add_field(
//!     DataField::builder("245", '1', '4')
//!         .subfield('a', "Nineteen Eighty-Four")
//!         .build(),
//! );
//!
//! let bytes = encode(&record)?;
//! let records = decode(&bytes);
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].control_field("001"), Some("ocm00001"));
//! # Ok::<(), marcwire::MarcError>(())
//! ```
//!
//! Strict decoding surfaces the first problem instead of stopping quietly:
//!
//! ```
//! use marcwire::{Decoder, MarcError, RecoveryMode};
//!
//! let decoder = Decoder::new().with_recovery_mode(RecoveryMode::Strict);
//! let result = decoder.decode(b"00099nam a2200025   4500");
//! assert!(matches!(result, Err(MarcError::TruncatedRecord(_))));
//! ```

use crate::boundary_scanner::{frame_at, RecordBoundaryScanner};
use crate::directory::parse_directory;
use crate::error::{MarcError, Result};
use crate::leader::Leader;
use crate::record::{ControlField, DataField, Field, Record, Tag};
use crate::recovery::{RecoveryContext, RecoveryMode, StreamStop};
use crate::{FIELD_TERMINATOR, RECORD_TERMINATOR, SUBFIELD_DELIMITER};

/// Decode every record in `buffer`, stopping quietly at trailing corruption.
///
/// Equivalent to `Decoder::new().decode_with_report(buffer)` keeping only the
/// records.
#[must_use]
pub fn decode(buffer: &[u8]) -> Vec<Record> {
    Decoder::new().records(buffer).filter_map(Result::ok).collect()
}

/// Decode one self-contained record.
///
/// `bytes` must be exactly the record's declared extent. Fields that point
/// outside the data region are skipped.
///
/// # Errors
///
/// Returns an error if the leader or directory cannot be parsed.
pub fn decode_record(bytes: &[u8]) -> Result<Record> {
    Decoder::new().decode_record(bytes)
}

/// Outcome of a decode that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodeReport {
    /// Records decoded, in stream order
    pub records: Vec<Record>,
    /// Set when the scan ended before the end of the buffer
    pub stopped: Option<StreamStop>,
    /// Problems skipped over inside records that were kept
    pub warnings: Vec<String>,
}

/// Configurable record decoder.
///
/// Decoders hold no state between calls and can be shared freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    recovery_mode: RecoveryMode,
    check_character_coding: bool,
}

impl Decoder {
    /// Create a decoder with the default fail-soft configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the recovery mode for handling malformed records.
    ///
    /// - `Lenient`: stop the stream quietly, skip bad fields (default)
    /// - `Strict`: return the first problem as an error
    #[must_use]
    pub fn with_recovery_mode(mut self, mode: RecoveryMode) -> Self {
        self.recovery_mode = mode;
        self
    }

    /// Reject records whose leader does not declare UTF-8.
    ///
    /// Off by default: position 9 of the leader is ignored and text is always
    /// decoded as UTF-8.
    #[must_use]
    pub fn with_character_coding_check(mut self, check: bool) -> Self {
        self.check_character_coding = check;
        self
    }

    /// The configured recovery mode.
    #[must_use]
    pub fn recovery_mode(&self) -> RecoveryMode {
        self.recovery_mode
    }

    /// Lazily decode the records in `buffer`.
    #[must_use]
    pub fn records<'a>(&self, buffer: &'a [u8]) -> RecordIter<'a> {
        RecordIter {
            decoder: *self,
            buffer,
            offset: 0,
            context: RecoveryContext::new(self.recovery_mode),
            stop: None,
        }
    }

    /// Decode every record in `buffer`.
    ///
    /// # Errors
    ///
    /// Only in strict mode: the first framing or parsing problem.
    pub fn decode(&self, buffer: &[u8]) -> Result<Vec<Record>> {
        self.decode_with_report(buffer).map(|report| report.records)
    }

    /// Decode every record in `buffer` and report how the scan ended.
    ///
    /// # Errors
    ///
    /// Only in strict mode: the first framing or parsing problem.
    pub fn decode_with_report(&self, buffer: &[u8]) -> Result<DecodeReport> {
        let mut iter = self.records(buffer);
        let mut records = Vec::with_capacity(RecordBoundaryScanner::estimate_records(buffer));
        for record in iter.by_ref() {
            records.push(record?);
        }
        Ok(DecodeReport {
            records,
            stopped: iter.stop,
            warnings: iter.context.recovery_messages,
        })
    }

    /// Decode one self-contained record.
    ///
    /// # Errors
    ///
    /// Returns an error if the leader or directory cannot be parsed, or, in
    /// strict mode, if any field is malformed.
    pub fn decode_record(&self, bytes: &[u8]) -> Result<Record> {
        let mut context = RecoveryContext::new(self.recovery_mode);
        self.parse_record(bytes, &mut context)
    }

    fn parse_record(&self, bytes: &[u8], context: &mut RecoveryContext) -> Result<Record> {
        let leader = Leader::from_bytes(bytes)?;
        leader.validate_for_reading(bytes.len())?;
        if self.check_character_coding && !leader.is_unicode() {
            return Err(MarcError::UnsupportedEncoding(format!(
                "leader declares character coding '{}', expected 'a'",
                leader.character_coding
            )));
        }

        let base_address = leader.data_base_address;
        let entries = parse_directory(bytes, base_address)?;

        let mut data = &bytes[base_address..];
        match data.split_last() {
            Some((&RECORD_TERMINATOR, rest)) => data = rest,
            _ => context.recover(
                MarcError::TruncatedRecord(
                    "record does not end with a record terminator".to_string(),
                ),
                "record",
            )?,
        }

        let mut record = Record::new(leader);
        record.fields.reserve(entries.len());

        for entry in entries {
            let Some(raw) = data.get(entry.start..entry.end()) else {
                context.recover(
                    MarcError::MalformedDirectory(format!(
                        "field {} spans {}..{} but the data region is {} bytes",
                        entry.tag,
                        entry.start,
                        entry.end(),
                        data.len()
                    )),
                    &format!("field {}", entry.tag),
                )?;
                continue;
            };
            let payload = match raw.split_last() {
                Some((&FIELD_TERMINATOR, rest)) => rest,
                _ => raw,
            };

            if entry.tag.is_control() {
                record.fields.push(Field::Control(ControlField {
                    tag: entry.tag,
                    text: String::from_utf8_lossy(payload).into_owned(),
                }));
            } else if let Some(field) = parse_data_field(entry.tag, payload, context)? {
                record.fields.push(Field::Data(field));
            }
        }

        Ok(record)
    }
}

/// Split a data field payload (terminator already removed) into indicators
/// and subfields.
fn parse_data_field(
    tag: Tag,
    payload: &[u8],
    context: &mut RecoveryContext,
) -> Result<Option<DataField>> {
    let [indicator1, indicator2, body @ ..] = payload else {
        context.recover(
            MarcError::InvalidField(format!(
                "field {tag}: {} bytes cannot hold two indicators",
                payload.len()
            )),
            &format!("field {tag}"),
        )?;
        return Ok(None);
    };

    let mut field = DataField::new(tag, char::from(*indicator1), char::from(*indicator2));

    // Everything before the first delimiter is discarded; a well-formed
    // payload has nothing there.
    let mut delimiters = memchr::memchr_iter(SUBFIELD_DELIMITER, body).peekable();
    while let Some(start) = delimiters.next() {
        let end = delimiters.peek().copied().unwrap_or(body.len());
        let chunk = String::from_utf8_lossy(&body[start + 1..end]);
        let mut chars = chunk.chars();
        match chars.next() {
            Some(code) => field.add_subfield(code, chars.as_str()),
            None => {
                tracing::debug!(tag = %field.tag, offset = start, "skipping subfield with no code");
            },
        }
    }

    Ok(Some(field))
}

/// Lazy iterator over the records of a buffer.
///
/// In lenient mode the iterator simply ends at the first record that cannot be
/// decoded. In strict mode it yields that error once and then ends.
#[derive(Debug)]
pub struct RecordIter<'a> {
    decoder: Decoder,
    buffer: &'a [u8],
    offset: usize,
    context: RecoveryContext,
    stop: Option<StreamStop>,
}

impl RecordIter<'_> {
    /// Offset of the next record to decode.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Why iteration ended early, if it did.
    #[must_use]
    pub fn stopped(&self) -> Option<&StreamStop> {
        self.stop.as_ref()
    }

    /// Problems skipped over inside records yielded so far.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.context.recovery_messages
    }
}

impl Iterator for RecordIter<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stop.is_some() || self.offset >= self.buffer.len() {
            return None;
        }

        let result = frame_at(self.buffer, self.offset).and_then(|length| {
            let bytes = &self.buffer[self.offset..self.offset + length];
            self.decoder
                .parse_record(bytes, &mut self.context)
                .map(|record| (record, length))
        });

        match result {
            Ok((record, length)) => {
                self.offset += length;
                Some(Ok(record))
            },
            Err(error) => {
                self.stop = Some(StreamStop {
                    offset: self.offset,
                    error: error.clone(),
                });
                match self.decoder.recovery_mode {
                    RecoveryMode::Strict => Some(Err(error)),
                    RecoveryMode::Lenient => {
                        tracing::warn!(offset = self.offset, %error, "stopping record scan");
                        None
                    },
                }
            },
        }
    }
}
