//! Recovery policy for malformed and truncated input.
//!
//! Stream decoding is fail-soft by default: a record that cannot be framed or
//! parsed ends the scan, and everything decoded before it is kept. Inside a
//! record, a field that points outside the data region is skipped. Strict mode
//! turns every one of these situations into an error instead.

use crate::error::{MarcError, Result};

/// Strategy for handling malformed or truncated records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryMode {
    /// Stop the stream quietly at the first bad record and skip bad fields (default)
    #[default]
    Lenient,
    /// Return an error for any malformation
    Strict,
}

/// Collects the problems recovered from while decoding.
#[derive(Debug, Default)]
pub struct RecoveryContext {
    /// Current recovery mode
    pub mode: RecoveryMode,
    /// Messages for each recovered problem, in the order they happened
    pub recovery_messages: Vec<String>,
}

impl RecoveryContext {
    /// Create a new recovery context with the given mode
    #[must_use]
    pub fn new(mode: RecoveryMode) -> Self {
        RecoveryContext {
            mode,
            recovery_messages: Vec::new(),
        }
    }

    /// Whether anything has been recovered from
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.recovery_messages.is_empty()
    }

    /// Recover from `error` according to the mode.
    ///
    /// # Errors
    ///
    /// Returns `error` unchanged in strict mode; otherwise logs and records it.
    pub fn recover(&mut self, error: MarcError, context: &str) -> Result<()> {
        match self.mode {
            RecoveryMode::Strict => Err(error),
            RecoveryMode::Lenient => {
                tracing::warn!(%error, context, "skipping malformed data");
                self.recovery_messages.push(format!("{context}: {error}"));
                Ok(())
            },
        }
    }
}

/// Why a fail-soft scan ended before the end of its buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamStop {
    /// Offset of the first byte that could not be decoded
    pub offset: usize,
    /// What was wrong at that offset
    pub error: MarcError,
}
