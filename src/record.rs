//! MARC record structures.
//!
//! This module provides the decoded form of one ISO 2709 record:
//! - [`Record`] - leader plus fields in directory order
//! - [`Field`] - either a [`ControlField`] (raw text) or a [`DataField`]
//! - [`Subfield`] - a coded element of a data field
//! - [`Tag`] - a three-character field tag
//!
//! # Examples
//!
//! Create a record with the builder API:
//!
//! ```
//! use marcwire::{DataField, Leader, Record};
//!
//! let record = Record::builder(Leader::default())
//!     .control_field("001", "12345")
//!     .field(
//!         DataField::builder("245", '1', '4')
//!             .subfield('a', "Nineteen Eighty-Four")
//!             .build(),
//!     )
//!     .build();
//!
//! assert_eq!(record.control_field("001"), Some("12345"));
//! ```
//!
//! Iterate by tag and subfield code:
//!
//! ```
//! # use marcwire::{DataField, Leader, Record};
//! # let record = Record::builder(Leader::default())
//! #     .field(DataField::builder("650", ' ', '0').subfield('a', "Dystopias").build())
//! #     .build();
//! for field in record.data_fields_by_tag("650") {
//!     for subject in field.subfields_by_code('a') {
//!         println!("Subject: {subject}");
//!     }
//! }
//! ```

use crate::directory::parse_digits;
use crate::error::{MarcError, Result};
use crate::leader::Leader;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// A three-character field tag.
///
/// Tags are not checked on construction; the encoder rejects any tag that is
/// not exactly three single-byte characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    /// Create a tag from text.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Tag(tag.to_string())
    }

    /// Create a tag from the three raw bytes of a directory entry.
    ///
    /// Each byte maps to exactly one character, so a tag read off the wire
    /// always has three characters.
    #[must_use]
    pub fn from_raw(bytes: [u8; 3]) -> Self {
        Tag(bytes.iter().copied().map(char::from).collect())
    }

    /// The tag text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this tag names a control field.
    ///
    /// A control tag is all ASCII digits with a numeric value below 10
    /// (`000`-`009`). Alphanumeric tags are data tags.
    #[must_use]
    pub fn is_control(&self) -> bool {
        self.0.len() == 3
            && parse_digits(self.0.as_bytes()).is_some_and(|value| value < 10)
    }

    /// The three bytes written into a directory entry.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidField`] unless the tag is exactly three
    /// characters in `U+0000..=U+00FF` other than the structural delimiters.
    /// This is the inverse of [`Tag::from_raw`].
    pub fn to_wire(&self) -> Result<[u8; 3]> {
        let invalid = || {
            MarcError::InvalidField(format!(
                "tag '{}' must be three single-byte characters",
                self.0
            ))
        };
        let mut wire = [0u8; 3];
        let mut chars = self.0.chars();
        for slot in &mut wire {
            let byte = chars
                .next()
                .and_then(|c| u8::try_from(c).ok())
                .filter(|&byte| !crate::is_structural(byte))
                .ok_or_else(invalid)?;
            *slot = byte;
        }
        if chars.next().is_some() {
            return Err(invalid());
        }
        Ok(wire)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tag {
    fn from(tag: &str) -> Self {
        Tag::new(tag)
    }
}

impl PartialEq<str> for Tag {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Tag {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A subfield within a data field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subfield {
    /// Subfield code (single character)
    pub code: char,
    /// Subfield data
    #[serde(rename = "data")]
    pub value: String,
}

impl Subfield {
    /// Create a subfield.
    #[must_use]
    pub fn new(code: char, value: impl Into<String>) -> Self {
        Subfield {
            code,
            value: value.into(),
        }
    }
}

/// A control field (`000`-`009`): raw text, no indicators or subfields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlField {
    /// Field tag
    pub tag: Tag,
    /// Field text
    pub text: String,
}

impl ControlField {
    /// Create a control field.
    #[must_use]
    pub fn new(tag: impl Into<Tag>, text: impl Into<String>) -> Self {
        ControlField {
            tag: tag.into(),
            text: text.into(),
        }
    }
}

/// A data field (`010` and above): two indicators and ordered subfields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataField {
    /// Field tag
    pub tag: Tag,
    /// First indicator
    #[serde(rename = "ind1")]
    pub indicator1: char,
    /// Second indicator
    #[serde(rename = "ind2")]
    pub indicator2: char,
    /// Subfields in the order they were written
    pub subfields: SmallVec<[Subfield; 4]>,
}

impl DataField {
    /// Create a data field with no subfields.
    #[must_use]
    pub fn new(tag: impl Into<Tag>, indicator1: char, indicator2: char) -> Self {
        DataField {
            tag: tag.into(),
            indicator1,
            indicator2,
            subfields: SmallVec::new(),
        }
    }

    /// Create a builder for constructing fields fluently
    ///
    /// # Examples
    ///
    /// ```
    /// use marcwire::DataField;
    ///
    /// let field = DataField::builder("245", '1', '0')
    ///     .subfield('a', "The Great Gatsby")
    ///     .subfield('c', "F. Scott Fitzgerald")
    ///     .build();
    /// assert_eq!(field.get_subfield('c'), Some("F. Scott Fitzgerald"));
    /// ```
    #[must_use]
    pub fn builder(tag: impl Into<Tag>, indicator1: char, indicator2: char) -> DataFieldBuilder {
        DataFieldBuilder {
            field: DataField::new(tag, indicator1, indicator2),
        }
    }

    /// Add a subfield after the existing ones
    pub fn add_subfield(&mut self, code: char, value: impl Into<String>) {
        self.subfields.push(Subfield::new(code, value));
    }

    /// Get first value for a subfield code
    #[must_use]
    pub fn get_subfield(&self, code: char) -> Option<&str> {
        self.subfields_by_code(code).next()
    }

    /// Iterate over all subfields
    pub fn subfields(&self) -> impl Iterator<Item = &Subfield> {
        self.subfields.iter()
    }

    /// Iterate over subfield values with a specific code
    pub fn subfields_by_code(&self, code: char) -> impl Iterator<Item = &str> {
        self.subfields
            .iter()
            .filter(move |sf| sf.code == code)
            .map(|sf| sf.value.as_str())
    }
}

/// Builder for [`DataField`]
#[derive(Debug)]
pub struct DataFieldBuilder {
    field: DataField,
}

impl DataFieldBuilder {
    /// Append a subfield
    #[must_use]
    pub fn subfield(mut self, code: char, value: impl Into<String>) -> Self {
        self.field.add_subfield(code, value);
        self
    }

    /// Build the field
    #[must_use]
    pub fn build(self) -> DataField {
        self.field
    }
}

/// One field of a record.
///
/// Serializes without a variant tag: control fields as `{tag, text}`, data
/// fields as `{tag, ind1, ind2, subfields}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Field {
    /// Raw text field
    Control(ControlField),
    /// Indicators and subfields
    Data(DataField),
}

impl Field {
    /// The field tag
    #[must_use]
    pub fn tag(&self) -> &Tag {
        match self {
            Field::Control(field) => &field.tag,
            Field::Data(field) => &field.tag,
        }
    }

    /// Whether this is a control field
    #[must_use]
    pub fn is_control(&self) -> bool {
        matches!(self, Field::Control(_))
    }

    /// The text of a control field
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Field::Control(field) => Some(&field.text),
            Field::Data(_) => None,
        }
    }

    /// The data field, if this is one
    #[must_use]
    pub fn as_data(&self) -> Option<&DataField> {
        match self {
            Field::Data(field) => Some(field),
            Field::Control(_) => None,
        }
    }
}

impl From<ControlField> for Field {
    fn from(field: ControlField) -> Self {
        Field::Control(field)
    }
}

impl From<DataField> for Field {
    fn from(field: DataField) -> Self {
        Field::Data(field)
    }
}

/// A MARC record
///
/// Fields keep the order of the directory they were decoded from (or the order
/// they were added in), with repeated tags interleaved as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Record leader (24 bytes)
    pub leader: Leader,
    /// Fields in directory order
    pub fields: Vec<Field>,
}

impl Default for Record {
    fn default() -> Self {
        Record::new(Leader::default())
    }
}

impl Record {
    /// Create an empty record with the given leader
    #[must_use]
    pub fn new(leader: Leader) -> Self {
        Record {
            leader,
            fields: Vec::new(),
        }
    }

    /// Create a builder for fluently constructing records
    #[must_use]
    pub fn builder(leader: Leader) -> RecordBuilder {
        RecordBuilder {
            record: Record::new(leader),
        }
    }

    /// Append a field
    pub fn add_field(&mut self, field: impl Into<Field>) {
        self.fields.push(field.into());
    }

    /// Append a control field
    pub fn add_control_field(&mut self, tag: impl Into<Tag>, text: impl Into<String>) {
        self.add_field(ControlField::new(tag, text));
    }

    /// Iterate over all fields in order
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Iterate over fields with the given tag
    pub fn fields_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields.iter().filter(move |field| field.tag() == tag)
    }

    /// Iterate over data fields with the given tag
    pub fn data_fields_by_tag<'a>(
        &'a self,
        tag: &'a str,
    ) -> impl Iterator<Item = &'a DataField> + 'a {
        self.fields_by_tag(tag).filter_map(Field::as_data)
    }

    /// Text of the first control field with the given tag
    #[must_use]
    pub fn control_field(&self, tag: &str) -> Option<&str> {
        self.fields
            .iter()
            .filter(|field| field.tag() == tag)
            .find_map(Field::text)
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builder for fluently constructing records
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Append a control field
    #[must_use]
    pub fn control_field(mut self, tag: impl Into<Tag>, text: impl Into<String>) -> Self {
        self.record.add_control_field(tag, text);
        self
    }

    /// Append a field
    #[must_use]
    pub fn field(mut self, field: impl Into<Field>) -> Self {
        self.record.add_field(field);
        self
    }

    /// Build the record
    #[must_use]
    pub fn build(self) -> Record {
        self.record
    }
}
