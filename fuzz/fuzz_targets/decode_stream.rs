#![no_main]

use libfuzzer_sys::fuzz_target;
use marcwire::{decode, Decoder, RecoveryMode};

fuzz_target!(|data: &[u8]| {
    let lenient = decode(data);
    let report = Decoder::new()
        .decode_with_report(data)
        .expect("lenient decoding never fails");
    assert_eq!(lenient, report.records);

    // Strict decoding agrees with lenient decoding up to the first failure.
    if let Ok(strict) = Decoder::new()
        .with_recovery_mode(RecoveryMode::Strict)
        .decode(data)
    {
        assert_eq!(strict.len(), lenient.len());
    }
});
