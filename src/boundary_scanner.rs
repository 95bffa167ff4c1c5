//! Record boundary detection by walking leaders.
//!
//! ISO 2709 records are self-delimiting: the first five bytes of each leader
//! give the record's total length. This module hops from leader to leader to
//! produce `(offset, length)` pairs without decoding any field data, applying the
//! same stop rule the stream decoder applies.
//!
//! # Example
//!
//! ```
//! use marcwire::boundary_scanner::RecordBoundaryScanner;
//! use marcwire::{build_record, ControlField};
//!
//! let record = build_record(&[ControlField::new("001", "42").into()])?;
//! let mut buffer = record.clone();
//! buffer.extend_from_slice(&record);
//!
//! let mut scanner = RecordBoundaryScanner::new();
//! let boundaries = scanner.scan(&buffer);
//! assert_eq!(boundaries, vec![(0, record.len()), (record.len(), record.len())]);
//! # Ok::<(), marcwire::MarcError>(())
//! ```

use crate::error::{MarcError, Result};
use crate::leader::{Leader, LEADER_LEN};
use crate::recovery::StreamStop;
use crate::RECORD_TERMINATOR;

/// Smallest well-formed record: a leader plus both terminators.
const MIN_RECORD_LEN: usize = LEADER_LEN + 2;

/// Length of the record starting at `offset`, checked against the buffer.
///
/// # Errors
///
/// - [`MarcError::TruncatedRecord`] if fewer than 24 bytes remain or the
///   declared length runs past the end of the buffer
/// - [`MarcError::MalformedLeader`] if the declared length is not five ASCII
///   digits, is zero, or is shorter than a leader
pub fn frame_at(buffer: &[u8], offset: usize) -> Result<usize> {
    let remaining = buffer.len().saturating_sub(offset);
    if remaining < LEADER_LEN {
        return Err(MarcError::TruncatedRecord(format!(
            "{remaining} trailing bytes cannot hold a {LEADER_LEN}-byte leader"
        )));
    }

    let length = Leader::declared_length(&buffer[offset..])?;
    if length < LEADER_LEN {
        return Err(MarcError::MalformedLeader(format!(
            "declared record length {length} is shorter than the leader"
        )));
    }
    if length > remaining {
        return Err(MarcError::TruncatedRecord(format!(
            "record declares {length} bytes but only {remaining} remain"
        )));
    }
    Ok(length)
}

/// Record boundary scanner.
///
/// Reusable across buffers; the boundary list is kept between scans to avoid
/// reallocating.
#[derive(Debug, Default)]
pub struct RecordBoundaryScanner {
    boundaries: Vec<(usize, usize)>,
    stop: Option<StreamStop>,
}

impl RecordBoundaryScanner {
    /// Create a new boundary scanner.
    #[must_use]
    pub fn new() -> Self {
        Self {
            boundaries: Vec::with_capacity(100),
            stop: None,
        }
    }

    /// Scan a buffer for record boundaries.
    ///
    /// Returns `(offset, length)` for every record that can be framed, in order.
    /// Scanning stops at the first offset where no valid record starts; the
    /// reason is available from [`stopped`](Self::stopped).
    pub fn scan(&mut self, buffer: &[u8]) -> Vec<(usize, usize)> {
        self.boundaries.clear();
        self.stop = None;

        let mut offset = 0;
        while offset < buffer.len() {
            match frame_at(buffer, offset) {
                Ok(length) => {
                    self.boundaries.push((offset, length));
                    offset += length;
                },
                Err(error) => {
                    self.stop = Some(StreamStop { offset, error });
                    break;
                },
            }
        }

        self.boundaries.clone()
    }

    /// Scan a buffer and return boundaries up to a maximum limit.
    pub fn scan_limited(&mut self, buffer: &[u8], limit: usize) -> Vec<(usize, usize)> {
        let mut boundaries = self.scan(buffer);
        boundaries.truncate(limit);
        boundaries
    }

    /// Why the last scan ended early, if it did.
    #[must_use]
    pub fn stopped(&self) -> Option<&StreamStop> {
        self.stop.as_ref()
    }

    /// Cheap upper-bound guess at the number of records in a buffer.
    ///
    /// Counts record terminator bytes, capped at the number of minimal
    /// records (leader, directory terminator, record terminator) that fit the
    /// buffer; used to pre-size result vectors.
    #[must_use]
    pub fn estimate_records(buffer: &[u8]) -> usize {
        memchr::memchr_iter(RECORD_TERMINATOR, buffer)
            .count()
            .min(buffer.len() / MIN_RECORD_LEN)
    }
}
