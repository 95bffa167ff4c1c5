#![no_main]

use libfuzzer_sys::fuzz_target;
use marcwire::{decode, encode_all};

// Anything the decoder accepts must re-encode and decode to the same fields.
fuzz_target!(|data: &[u8]| {
    let records = decode(data);
    let Ok(bytes) = encode_all(&records) else {
        return;
    };
    let again = decode(&bytes);
    assert_eq!(again.len(), records.len());
    for (first, second) in records.iter().zip(&again) {
        assert_eq!(first.fields, second.fields);
    }
});
