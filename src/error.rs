//! Error types for MARC operations.
//!
//! This module provides the [`MarcError`] type for all MARC library operations
//! and the [`Result`] convenience type.

use thiserror::Error;

/// Error type for all MARC library operations.
///
/// Covers binary decode errors, merge configuration errors, and the ordering
/// errors raised by the combining reader.
#[derive(Error, Debug)]
pub enum MarcError {
    /// Error indicating an invalid or malformed MARC record.
    #[error("Invalid MARC record: {0}")]
    InvalidRecord(String),

    /// Error indicating an invalid leader (24-byte header).
    #[error("Invalid leader: {0}")]
    InvalidLeader(String),

    /// Error indicating a truncated or incomplete record.
    #[error("Truncated record: {0}")]
    TruncatedRecord(String),

    /// Error indicating an invalid combine configuration value, such as a
    /// merge selector pattern that fails to compile or a malformed match
    /// field specification.
    #[error("Invalid combine configuration: {0}")]
    InvalidConfig(String),

    /// Error indicating the input stream violates its sort order contract.
    ///
    /// Raised by the combining reader when a holdings-summary record does not
    /// match the record being assembled, or when a bibliographic record's key
    /// sorts before it. The input cannot be trusted past this point, so the
    /// reader yields no further records after raising it.
    #[error(
        "Record {found_key} came after record {current_key}: {detail}. Cannot read file further"
    )]
    OutOfSequence {
        /// Match key of the record being assembled when the violation was hit.
        current_key: String,
        /// Match key of the offending record.
        found_key: String,
        /// What kind of violation this is.
        detail: String,
    },

    /// Error indicating a record was requested from an exhausted source.
    ///
    /// This is a caller contract violation: check `has_next()` before asking
    /// for the next record. Ordinary end of input is not an error.
    #[error("No record available: source is exhausted")]
    EmptySource,

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Convenience type alias for [`std::result::Result`] with [`MarcError`].
pub type Result<T> = std::result::Result<T, MarcError>;
