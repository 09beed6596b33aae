//! Domain-specific error types for the Cleanmate protocol.
//!
//! All fallible operations return `Result<T, CleanmateError>`.
//! Every variant is classified by [`CleanmateError::kind`] so callers can
//! tell a timeout (worth retrying) from a dropped connection (often a bad
//! auth code) without matching on individual variants.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, CleanmateError>;

/// The canonical error type for the Cleanmate protocol.
#[derive(Debug, Error)]
pub enum CleanmateError {
    // ── Configuration Errors ─────────────────────────────────────
    /// The host is not a valid IP address.
    #[error("invalid host address: {0:?}")]
    InvalidHost(String),

    /// The auth code does not have exactly `AUTH_CODE_LENGTH` characters.
    #[error("invalid auth code: expected 10 characters, got {0}")]
    InvalidAuthCode(usize),

    /// An argument is out of the range the device accepts.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // ── Connection Errors ────────────────────────────────────────
    /// The TCP/IO layer reported an error.
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// The device closed the connection before a full frame arrived.
    ///
    /// The device answers a wrong auth code this way, so this is also
    /// the error reported for authentication failures.
    #[error("connection closed by device after {received} of {expected} bytes")]
    ConnectionClosed { received: usize, expected: usize },

    /// An operation exceeded its deadline.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    // ── Decode Errors ────────────────────────────────────────────
    /// The size prefix of a received frame is not usable.
    #[error("invalid header: {0}")]
    InvalidHeader(&'static str),

    /// Frame size exceeded the codec limit.
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// The received frame is shorter or longer than its prefix claims.
    #[error("invalid packet length: expected {expected}, got {actual}")]
    InvalidPacketLength { expected: usize, actual: usize },

    /// UTF-8 conversion of a frame body failed.
    #[error("invalid utf-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A response was well-formed but lacked the structure a query needs.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(&'static str),

    // ── Enumerant Errors ─────────────────────────────────────────
    /// A numeric value did not map to any known enum variant.
    #[error("unknown {type_name} value: {value}")]
    UnknownVariant { type_name: &'static str, value: i64 },
}

// ── ErrorKind ─────────────────────────────────────────────────────

/// Coarse classification of a [`CleanmateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected locally before any network activity.
    InvalidConfiguration,
    /// Connect failure, write failure, or the device hung up mid-exchange.
    Connectivity,
    /// No response within the per-request deadline.
    Timeout,
    /// The response could not be framed or parsed.
    Decode,
    /// A device enumeration value outside the known set.
    UnknownEnumerant,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl CleanmateError {
    /// The coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidHost(_) | Self::InvalidAuthCode(_) | Self::InvalidArgument(_) => {
                ErrorKind::InvalidConfiguration
            }
            Self::Connection(_) | Self::ConnectionClosed { .. } => ErrorKind::Connectivity,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::InvalidHeader(_)
            | Self::FrameTooLarge { .. }
            | Self::InvalidPacketLength { .. }
            | Self::InvalidUtf8(_)
            | Self::Json(_)
            | Self::UnexpectedResponse(_) => ErrorKind::Decode,
            Self::UnknownVariant { .. } => ErrorKind::UnknownEnumerant,
        }
    }

    /// Returns `true` if repeating the same request may succeed.
    ///
    /// Only timeouts qualify: a closed connection usually means the
    /// device rejected the auth code and will keep doing so.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }
}
