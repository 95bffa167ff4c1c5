//! Parallel record decoding using Rayon.
//!
//! Records are framed sequentially by hopping from leader to leader (cheap),
//! then each record body is decoded on Rayon's work-stealing pool. The result
//! is identical to sequential decoding: source order is kept and the stream
//! ends at the first record that fails.
//!
//! # Examples
//!
//! ```
//! use marcwire::{decode, decode_parallel, encode_all, Record};
//!
//! let records: Vec<Record> = (0..100)
//!     .map(|i| Record::builder(Default::default()).control_field("001", format!("{i}")).build())
//!     .collect();
//! let buffer = encode_all(&records)?;
//!
//! assert_eq!(decode_parallel(&buffer), decode(&buffer));
//! # Ok::<(), marcwire::MarcError>(())
//! ```

use crate::boundary_scanner::RecordBoundaryScanner;
use crate::error::Result;
use crate::reader::Decoder;
use crate::record::Record;
use crate::recovery::RecoveryMode;
use rayon::prelude::*;

/// Decode every record in `buffer` in parallel, stopping quietly at trailing
/// corruption.
#[must_use]
pub fn decode_parallel(buffer: &[u8]) -> Vec<Record> {
    // Lenient decoding never returns an error.
    Decoder::new().decode_parallel(buffer).unwrap_or_default()
}

impl Decoder {
    /// Decode every record in `buffer` on Rayon's thread pool.
    ///
    /// Uses the global pool, which respects `RAYON_NUM_THREADS`.
    ///
    /// # Errors
    ///
    /// Only in strict mode: the first framing or parsing problem in stream
    /// order.
    pub fn decode_parallel(&self, buffer: &[u8]) -> Result<Vec<Record>> {
        let mut scanner = RecordBoundaryScanner::new();
        let boundaries = scanner.scan(buffer);

        let decoded: Vec<Result<Record>> = boundaries
            .par_iter()
            .map(|&(offset, length)| self.decode_record(&buffer[offset..offset + length]))
            .collect();

        let mut records = Vec::with_capacity(decoded.len());
        for (result, &(offset, _)) in decoded.into_iter().zip(&boundaries) {
            match result {
                Ok(record) => records.push(record),
                Err(error) if self.recovery_mode() == RecoveryMode::Strict => return Err(error),
                Err(error) => {
                    tracing::warn!(offset, %error, "stopping parallel record scan");
                    return Ok(records);
                },
            }
        }

        if let Some(stop) = scanner.stopped() {
            if self.recovery_mode() == RecoveryMode::Strict {
                return Err(stop.error.clone());
            }
            tracing::warn!(
                offset = stop.offset,
                error = %stop.error,
                "stopping parallel record scan"
            );
        }
        Ok(records)
    }
}
