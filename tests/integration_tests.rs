//! Integration tests for the marcwire codec

mod common;

use common::{create_test_fields, create_test_record, raw_record, raw_record_with_gap};
use marcwire::{
    build_field, build_record, decode, decode_record, encode, encode_all, ControlField,
    DataField, Decoder, Field, MarcError, Record, RecoveryMode, StreamEncoder, Subfield, Tag,
};

#[test]
fn test_round_trip_single_record() {
    let fields = create_test_fields("ocm00000001");
    let bytes = build_record(&fields).expect("Failed to encode record");

    let records = decode(&bytes);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].fields, fields);

    // Leader lengths are filled in by the encoder
    assert_eq!(records[0].leader.record_length, bytes.len());
    assert_eq!(records[0].leader.data_base_address, 24 + 5 * 12 + 1);
}

#[test]
fn test_round_trip_keeps_field_order_and_repeats() {
    let record = Record::builder(Default::default())
        .control_field("001", "x")
        .field(DataField::builder("650", ' ', '0').subfield('a', "Second").build())
        .field(DataField::builder("245", '0', '0').subfield('a', "Title").build())
        .field(DataField::builder("650", ' ', '0').subfield('a', "First").build())
        .build();

    let decoded = decode_record(&encode(&record).unwrap()).unwrap();
    let tags: Vec<&str> = decoded.fields().map(|f| f.tag().as_str()).collect();
    assert_eq!(tags, ["001", "650", "245", "650"]);

    let subjects: Vec<&str> = decoded
        .data_fields_by_tag("650")
        .filter_map(|f| f.get_subfield('a'))
        .collect();
    assert_eq!(subjects, ["Second", "First"]);
}

#[test]
fn test_concatenation_decodes_in_order() {
    let records: Vec<Record> = (0..25)
        .map(|i| create_test_record(&format!("ocm{i:08}")))
        .collect();
    let buffer = encode_all(&records).unwrap();

    let decoded = decode(&buffer);
    assert_eq!(decoded.len(), 25);
    for (i, (original, decoded)) in records.iter().zip(&decoded).enumerate() {
        assert_eq!(decoded.fields, original.fields, "record {i}");
    }
}

#[test]
fn test_concatenation_equals_individual_encodings() {
    let first = build_record(&create_test_fields("a")).unwrap();
    let second = build_record(&create_test_fields("b")).unwrap();
    let mut joined = first.clone();
    joined.extend_from_slice(&second);

    let mut stream = StreamEncoder::new();
    stream.push_fields(&create_test_fields("a")).unwrap();
    stream.push_fields(&create_test_fields("b")).unwrap();

    assert_eq!(stream.as_bytes(), joined.as_slice());
    assert_eq!(decode(&joined).len(), 2);
}

#[test]
fn test_truncated_tail_is_dropped() {
    let records: Vec<Record> = (0..3).map(|i| create_test_record(&i.to_string())).collect();
    let buffer = encode_all(&records).unwrap();
    let third_start = encode_all(&records[..2]).unwrap().len();

    // Every cut inside the third record leaves the first two intact.
    for cut in [third_start + 1, third_start + 5, third_start + 30, buffer.len() - 1] {
        let decoded = decode(&buffer[..cut]);
        assert_eq!(decoded.len(), 2, "cut at {cut}");
        assert_eq!(decoded[1].control_field("001"), Some("1"));
    }
}

#[test]
fn test_trailing_garbage_is_ignored() {
    let mut buffer = build_record(&create_test_fields("only")).unwrap();
    buffer.extend_from_slice(b"\n\n");
    assert_eq!(decode(&buffer).len(), 1);

    buffer.extend_from_slice(b"abcdefghijklmnopqrstuvwxyz");
    assert_eq!(decode(&buffer).len(), 1);
}

#[test]
fn test_empty_and_malformed_buffers() {
    assert!(decode(b"").is_empty());
    assert!(decode(b"garbage that is long enough to look like a leader").is_empty());
    assert!(decode(b"00000nam a2200025   4500\x1e\x1d").is_empty());
}

#[test]
fn test_classification_of_control_and_data_fields() {
    let bytes = raw_record(&[("001", b"12345"), ("245", b"10\x1faTitle")]);
    let record = decode_record(&bytes).unwrap();

    assert_eq!(record.fields.len(), 2);
    assert_eq!(
        record.fields[0],
        Field::Control(ControlField::new("001", "12345"))
    );
    let title = record.fields[1].as_data().expect("245 is a data field");
    assert_eq!(title.indicator1, '1');
    assert_eq!(title.indicator2, '0');
    assert_eq!(
        title.subfields().cloned().collect::<Vec<_>>(),
        vec![Subfield::new('a', "Title")]
    );
}

#[test]
fn test_gap_after_directory_terminator_is_ignored() {
    let fields: &[(&str, &[u8])] = &[("001", b"12345"), ("245", b"10\x1faTitle")];
    let padded = raw_record_with_gap(fields, 12);
    let plain = raw_record(fields);
    assert_eq!(padded.len(), plain.len() + 12);

    let mut buffer = padded.clone();
    buffer.extend_from_slice(&plain);
    let records = decode(&buffer);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].fields, records[1].fields);
    assert_eq!(records[0].leader.data_base_address, 24 + 2 * 12 + 1 + 12);
    assert_eq!(records[0].control_field("001"), Some("12345"));
}

#[test]
fn test_alphanumeric_tags_are_data_fields() {
    let bytes = raw_record(&[("00A", b"  \x1faLocal"), ("LDR", b"12\x1fbx")]);
    let record = decode_record(&bytes).unwrap();

    assert!(record.fields.iter().all(|f| !f.is_control()));
    assert_eq!(record.fields[0].tag(), "00A");
    assert_eq!(
        record.fields[1].as_data().and_then(|f| f.get_subfield('b')),
        Some("x")
    );
}

#[test]
fn test_nineteen_eighty_four_data_field() {
    let field = DataField::builder("245", '1', '4')
        .subfield('a', "Nineteen Eighty-Four")
        .build();

    let content = build_field(&field.clone().into()).unwrap();
    assert_eq!(content, b"14\x1faNineteen Eighty-Four\x1e");

    let bytes = build_record(&[field.into()]).unwrap();
    let record = decode(&bytes).pop().expect("one record");
    let decoded = record.data_fields_by_tag("245").next().expect("245 present");

    assert_eq!(decoded.tag, Tag::new("245"));
    assert_eq!(decoded.indicator1, '1');
    assert_eq!(decoded.indicator2, '4');
    assert_eq!(decoded.subfields.len(), 1);
    assert_eq!(decoded.get_subfield('a'), Some("Nineteen Eighty-Four"));
}

#[test]
fn test_empty_subfield_chunks_are_skipped() {
    let bytes = raw_record(&[("245", b"00\x1f\x1faTitle\x1f")]);
    let record = decode_record(&bytes).unwrap();

    let field = record.fields[0].as_data().unwrap();
    assert_eq!(
        field.subfields().cloned().collect::<Vec<_>>(),
        vec![Subfield::new('a', "Title")]
    );
}

#[test]
fn test_subfield_with_code_only_is_kept() {
    let bytes = raw_record(&[("245", b"00\x1fa\x1fbText")]);
    let record = decode_record(&bytes).unwrap();
    let field = record.fields[0].as_data().unwrap();

    assert_eq!(field.get_subfield('a'), Some(""));
    assert_eq!(field.get_subfield('b'), Some("Text"));
}

#[test]
fn test_utf8_text_round_trips() {
    let field = DataField::builder("245", '1', '0')
        .subfield('a', "Café society / Ἀριστοτέλης")
        .subfield('c', "東京")
        .build();
    let bytes = build_record(&[field.clone().into()]).unwrap();

    let record = decode_record(&bytes).unwrap();
    assert_eq!(record.fields, vec![Field::from(field)]);
}

#[test]
fn test_leader_positions_survive_encoding() {
    let mut record = create_test_record("leader");
    record.leader.record_status = 'c';
    record.leader.record_type = 'j';
    record.leader.encoding_level = '7';

    let bytes = encode(&record).unwrap();
    assert_eq!(&bytes[5..10], b"cjm a");

    let decoded = decode_record(&bytes).unwrap();
    assert_eq!(decoded.leader.record_status, 'c');
    assert_eq!(decoded.leader.record_type, 'j');
    assert_eq!(decoded.leader.encoding_level, '7');
}

#[test]
fn test_encoder_rejects_oversized_field() {
    let field = ControlField::new("005", "x".repeat(10_000));
    let result = build_record(&[field.into()]);
    assert!(matches!(result, Err(MarcError::FieldWidthOverflow(_))));
}

#[test]
fn test_encoder_rejects_structural_bytes() {
    let field = DataField::builder("245", '0', '0')
        .subfield('a', "bad\x1evalue")
        .build();
    assert!(matches!(
        build_record(&[field.into()]),
        Err(MarcError::InvalidField(_))
    ));
}

#[test]
fn test_strict_mode_reports_first_failure() {
    let mut buffer = build_record(&create_test_fields("good")).unwrap();
    buffer.extend_from_slice(b"99999nam a22");

    let lenient = Decoder::new().decode_with_report(&buffer).unwrap();
    assert_eq!(lenient.records.len(), 1);
    let stop = lenient.stopped.expect("scan stopped early");
    assert_eq!(stop.offset, buffer.len() - 12);
    assert!(matches!(stop.error, MarcError::TruncatedRecord(_)));

    let strict = Decoder::new().with_recovery_mode(RecoveryMode::Strict);
    assert!(matches!(
        strict.decode(&buffer),
        Err(MarcError::TruncatedRecord(_))
    ));
}

#[test]
fn test_strict_mode_rejects_bad_field_lenient_skips_it() {
    // One field points beyond the data region.
    let mut bytes = raw_record(&[("001", b"id"), ("245", b"00\x1faTitle")]);
    let entry = 24 + 12;
    bytes[entry + 3..entry + 7].copy_from_slice(b"0900");

    let lenient = Decoder::new().decode_with_report(&bytes).unwrap();
    assert_eq!(lenient.records.len(), 1);
    assert_eq!(lenient.records[0].fields.len(), 1);
    assert_eq!(lenient.warnings.len(), 1);

    let strict = Decoder::new().with_recovery_mode(RecoveryMode::Strict);
    assert!(matches!(
        strict.decode_record(&bytes),
        Err(MarcError::MalformedDirectory(_))
    ));
}

#[test]
fn test_character_coding_check() {
    let mut bytes = build_record(&create_test_fields("marc8")).unwrap();
    bytes[9] = b' ';

    assert_eq!(decode(&bytes).len(), 1);

    let checking = Decoder::new().with_character_coding_check(true);
    assert!(checking.decode(&bytes).unwrap().is_empty());
    assert!(matches!(
        checking.decode_record(&bytes),
        Err(MarcError::UnsupportedEncoding(_))
    ));
}

#[test]
fn test_lazy_iterator_tracks_offset() {
    let buffer = encode_all(&[create_test_record("1"), create_test_record("2")]).unwrap();
    let mut iter = Decoder::new().records(&buffer);

    assert_eq!(iter.offset(), 0);
    let first = iter.next().unwrap().unwrap();
    assert_eq!(first.control_field("001"), Some("1"));
    assert_eq!(iter.offset(), buffer.len() / 2);
    assert!(iter.next().is_some());
    assert!(iter.next().is_none());
    assert!(iter.stopped().is_none());
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_decode_matches_sequential() {
    let records: Vec<Record> = (0..200)
        .map(|i| create_test_record(&format!("p{i:05}")))
        .collect();
    let mut buffer = encode_all(&records).unwrap();
    buffer.extend_from_slice(b"00050");

    let parallel = marcwire::decode_parallel(&buffer);
    assert_eq!(parallel.len(), 200);
    assert_eq!(parallel, decode(&buffer));
}
