//! JSON view of decoded records.
//!
//! Consumers that iterate records by tag and subfield code often want a plain
//! data view. Each record becomes:
//!
//! ```json
//! {
//!   "leader": "00061nam a2200037   4500",
//!   "fields": [
//!     { "tag": "001", "text": "12345" },
//!     { "tag": "245", "ind1": "1", "ind2": "4",
//!       "subfields": [ { "code": "a", "data": "Nineteen Eighty-Four" } ] }
//!   ]
//! }
//! ```
//!
//! # Examples
//!
//! ```
//! use marcwire::{json, DataField, Record};
//!
//! let mut record = Record::default();
//! record.add_field(DataField::builder("245", '1', '4').subfield('a', "Title").build());
//!
//! let value = json::record_to_json(&record)?;
//! assert_eq!(value["fields"][0]["subfields"][0]["data"], "Title");
//!
//! let restored = json::json_to_record(&value)?;
//! assert_eq!(restored.fields, record.fields);
//! # Ok::<(), marcwire::MarcError>(())
//! ```

use crate::error::{MarcError, Result};
use crate::leader::Leader;
use crate::record::{Field, Record};
use serde_json::{json, Value};

/// Convert a record to its JSON view.
///
/// # Errors
///
/// Returns an error if the leader cannot be serialized.
pub fn record_to_json(record: &Record) -> Result<Value> {
    let leader = record.leader.to_bytes()?;
    let fields = serde_json::to_value(&record.fields)
        .map_err(|e| MarcError::InvalidJson(e.to_string()))?;
    Ok(json!({
        "leader": leader.iter().copied().map(char::from).collect::<String>(),
        "fields": fields,
    }))
}

/// Convert a list of records to a JSON array.
///
/// # Errors
///
/// Fails on the first record whose leader cannot be serialized.
pub fn records_to_json(records: &[Record]) -> Result<Value> {
    records
        .iter()
        .map(record_to_json)
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

/// Convert a JSON view back into a record.
///
/// Reverses the transformation performed by [`record_to_json`].
///
/// # Errors
///
/// Returns [`MarcError::InvalidJson`] if the value is not shaped like a record
/// view, or a leader error if the leader string is not a valid leader.
pub fn json_to_record(json: &Value) -> Result<Record> {
    let leader = json
        .get("leader")
        .and_then(Value::as_str)
        .ok_or_else(|| MarcError::InvalidJson("missing leader string".to_string()))?;
    let leader_bytes = leader
        .chars()
        .map(|c| u8::try_from(c).map_err(|_| MarcError::InvalidJson(format!("leader char {c:?}"))))
        .collect::<Result<Vec<u8>>>()?;
    let leader = Leader::from_bytes(&leader_bytes)?;

    let fields = json
        .get("fields")
        .cloned()
        .ok_or_else(|| MarcError::InvalidJson("missing fields array".to_string()))?;
    let fields: Vec<Field> =
        serde_json::from_value(fields).map_err(|e| MarcError::InvalidJson(e.to_string()))?;

    Ok(Record { leader, fields })
}
