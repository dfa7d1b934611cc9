//! Byte-level error types.

/// Errors that can occur while encoding or decoding save data.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The stream was written by an incompatible major version.
    #[error("cannot read data with major version {found} (current version: {expected})")]
    VersionMismatch {
        /// Version found in the stream.
        found: u16,
        /// Version this build reads and writes.
        expected: u16,
    },

    /// The stream ended before a value was complete.
    #[error("unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        /// Bytes required by the value being read.
        needed: usize,
        /// Bytes left in the stream.
        remaining: usize,
    },

    /// A string, blob, or count does not fit its 16-bit length prefix.
    #[error("{kind} of length {len} exceeds the 16-bit limit of 65535")]
    TooLong {
        /// What was being written (`"string"`, `"blob"`, `"component count"`, ...).
        kind: &'static str,
        /// The offending length.
        len: usize,
    },

    /// A boolean byte was neither 0 nor 1.
    #[error("invalid boolean byte {0:#04x}")]
    InvalidBool(u8),

    /// A string was not valid UTF-8.
    #[error("string is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// Bytes were left over after a complete value was read.
    #[error("{0} unexpected trailing bytes")]
    TrailingBytes(usize),
}
