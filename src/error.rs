//! Unified error types for rememberall.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (feature `defmt`) for efficient on-target
//! logging.

use core::fmt;

/// Top-level error type used across the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// An inbound message could not be decoded.
    Decode(DecodeError),

    /// The e-paper panel rejected a draw or clear.
    Display,

    /// Pushing a frame to the LED ring failed.
    Led,

    /// A publish was attempted while the broker link is down.
    NotConnected,

    /// The transport refused or dropped a publish.
    PublishRejected,

    /// Buffer too small for the requested operation.
    BufferOverflow,
}

/// Reasons an inbound text or reminder message is rejected.
///
/// A rejected message never touches the active item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Text message: the line count is outside 1..=3 or does not match
    /// the number of `color;text` segments.
    MalformedLineCount,

    /// Text message: a segment is not exactly `color;text`, or its color
    /// code is not a decimal integer.
    MalformedLineEntry,

    /// Reminder message: not exactly four `|` separated fields.
    TokenCountMismatch,

    /// Reminder message: a field is not a hexadecimal integer.
    InvalidNumber,

    /// Payload is not valid UTF-8.
    InvalidUtf8,

    /// Payload exceeds the maximum message size.
    PayloadTooLong,
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Error::Decode(e)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DecodeError::MalformedLineCount => "line count does not match segments",
            DecodeError::MalformedLineEntry => "segment is not color;text",
            DecodeError::TokenCountMismatch => "expected exactly 4 reminder fields",
            DecodeError::InvalidNumber => "field is not a hexadecimal number",
            DecodeError::InvalidUtf8 => "payload is not UTF-8",
            DecodeError::PayloadTooLong => "payload too long",
        };
        f.write_str(msg)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Decode(e) => write!(f, "decode failed: {}", e),
            Error::Display => f.write_str("display error"),
            Error::Led => f.write_str("LED ring error"),
            Error::NotConnected => f.write_str("broker not connected"),
            Error::PublishRejected => f.write_str("publish rejected"),
            Error::BufferOverflow => f.write_str("buffer overflow"),
        }
    }
}
