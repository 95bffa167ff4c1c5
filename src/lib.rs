#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # marcwire: ISO 2709 / MARC21 record codec
//!
//! Decodes byte buffers holding one or more concatenated MARC records into
//! structured [`Record`] values, and encodes records back into the wire
//! format so that decoding the output yields the same records.
//!
//! ## Quick Start
//!
//! ```
//! use marcwire::{build_record, decode, DataField, Field, ControlField};
//!
//! let fields = vec![
//!     Field::from(ControlField::new("001", "ocm00012345")),
//!     Field::from(
//!         DataField::builder("245", '1', '4')
//!             .subfield('a', "Nineteen Eighty-Four")
//!             .build(),
//!     ),
//! ];
//!
//! let bytes = build_record(&fields)?;
//! let records = decode(&bytes);
//!
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].fields, fields);
//! # Ok::<(), marcwire::MarcError>(())
//! ```
//!
//! ## Failure model
//!
//! Decoding is fail-soft: [`decode`] returns every record that precedes the
//! first unparsable one and never returns an error. Use a [`Decoder`] in
//! [`RecoveryMode::Strict`] to surface the failure instead, or
//! [`Decoder::decode_with_report`] to get both the records and the reason the
//! scan ended. Encoding is fail-hard: any value that does not fit the fixed
//! widths of the format yields an error.
//!
//! ## Modules
//!
//! - [`record`] - Record, field and subfield types
//! - [`leader`] - The 24-byte record header
//! - [`directory`] - 12-byte directory entries
//! - [`reader`] - Decoding records from buffers
//! - [`writer`] - Encoding fields and records
//! - [`boundary_scanner`] - Locating records inside a concatenated buffer
//! - [`recovery`] - Lenient and strict handling of malformed input
//! - [`json`] - JSON view of records
//! - `parallel` - Rayon-backed decoding (feature `parallel`)

pub mod boundary_scanner;
pub mod directory;
pub mod error;
pub mod json;
pub mod leader;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod reader;
pub mod record;
pub mod recovery;
pub mod writer;

pub use boundary_scanner::{frame_at, RecordBoundaryScanner};
pub use directory::{DirectoryEntry, DIRECTORY_ENTRY_LEN};
pub use error::{MarcError, Result};
pub use leader::{Leader, LEADER_LEN};
#[cfg(feature = "parallel")]
pub use parallel::decode_parallel;
pub use reader::{decode, decode_record, DecodeReport, Decoder, RecordIter};
pub use record::{
    ControlField, DataField, DataFieldBuilder, Field, Record, RecordBuilder, Subfield, Tag,
};
pub use recovery::{RecoveryContext, RecoveryMode, StreamStop};
pub use writer::{
    build_control_field, build_data_field, build_field, build_record, encode, encode_all,
    StreamEncoder, MAX_FIELD_LENGTH, MAX_FIELD_OFFSET,
};

/// Introduces each subfield inside a data field (`0x1F`).
pub const SUBFIELD_DELIMITER: u8 = 0x1F;

/// Ends the directory and every field (`0x1E`).
pub const FIELD_TERMINATOR: u8 = 0x1E;

/// Ends every record (`0x1D`).
pub const RECORD_TERMINATOR: u8 = 0x1D;

/// Whether `byte` is one of the three structural separators.
#[must_use]
pub const fn is_structural(byte: u8) -> bool {
    matches!(byte, SUBFIELD_DELIMITER | FIELD_TERMINATOR | RECORD_TERMINATOR)
}
