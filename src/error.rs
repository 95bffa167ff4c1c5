//! Error types for MARC codec operations.
//!
//! This module provides the [`MarcError`] type for all decoding and encoding
//! operations and the [`Result`] convenience type.

use thiserror::Error;

/// Error type for all MARC codec operations.
///
/// Decode-time variants describe a record that could not be framed or parsed;
/// encode-time variants describe fields that cannot be represented in the
/// fixed-width ISO 2709 layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarcError {
    /// The 24-byte leader is short, or its length/base address is not usable.
    #[error("Malformed leader: {0}")]
    MalformedLeader(String),

    /// The record declares more bytes than remain in the buffer.
    #[error("Truncated record: {0}")]
    TruncatedRecord(String),

    /// No directory terminator was found within the directory span.
    #[error("Directory overflow: {0}")]
    DirectoryOverflow(String),

    /// A directory entry has non-digit widths or points outside the data region.
    #[error("Malformed directory: {0}")]
    MalformedDirectory(String),

    /// A field length or offset does not fit its fixed digit width.
    #[error("Field width overflow: {0}")]
    FieldWidthOverflow(String),

    /// A field cannot be represented structurally.
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// A JSON view could not be converted back into a record.
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// The leader declares a character coding other than UTF-8.
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),
}

/// Convenience type alias for [`std::result::Result`] with [`MarcError`].
pub type Result<T> = std::result::Result<T, MarcError>;
