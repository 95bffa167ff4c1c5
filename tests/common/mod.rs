//! Common test helpers and utilities shared across test suite.

use marcwire::{DataField, Field, Leader, Record};

/// Creates a small bibliographic record with control and data fields.
pub fn create_test_record(id: &str) -> Record {
    Record::builder(Leader::default())
        .control_field("001", id)
        .control_field("008", "200101s2000    xxu           000 0 eng d")
        .field(
            DataField::builder("100", '1', ' ')
                .subfield('a', "Orwell, George")
                .subfield('d', "1903-1950")
                .build(),
        )
        .field(
            DataField::builder("245", '1', '4')
                .subfield('a', "Nineteen Eighty-Four")
                .subfield('c', "George Orwell")
                .build(),
        )
        .field(
            DataField::builder("650", ' ', '0')
                .subfield('a', "Totalitarianism")
                .subfield('v', "Fiction")
                .build(),
        )
        .build()
}

/// The field list of [`create_test_record`], for `build_record` callers.
#[allow(dead_code)]
pub fn create_test_fields(id: &str) -> Vec<Field> {
    create_test_record(id).fields
}

/// Assemble a record by hand from `(tag, body)` pairs, bypassing the encoder.
///
/// Bodies are written as-is followed by a field terminator, so callers can
/// produce wire images the encoder would refuse to emit.
#[allow(dead_code)]
pub fn raw_record(fields: &[(&str, &[u8])]) -> Vec<u8> {
    raw_record_with_gap(fields, 0)
}

/// Like [`raw_record`], with `gap` filler bytes between the directory
/// terminator and the base address.
#[allow(dead_code)]
pub fn raw_record_with_gap(fields: &[(&str, &[u8])], gap: usize) -> Vec<u8> {
    let mut directory = Vec::new();
    let mut data = Vec::new();
    for (tag, body) in fields {
        let length = body.len() + 1;
        directory.extend_from_slice(format!("{tag}{length:04}{:05}", data.len()).as_bytes());
        data.extend_from_slice(body);
        data.push(0x1E);
    }
    directory.push(0x1E);
    directory.extend(std::iter::repeat(b' ').take(gap));
    data.push(0x1D);

    let base = 24 + directory.len();
    let total = base + data.len();
    let mut out = format!("{total:05}nam a22{base:05}   4500").into_bytes();
    out.extend_from_slice(&directory);
    out.extend_from_slice(&data);
    out
}
