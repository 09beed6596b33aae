//! The authenticated wrapper around every command.

use std::fmt;

use serde::Serialize;

use crate::error::{CleanmateError, Result};
use crate::packet::Packet;
use crate::protocol::command::CommandPayload;

/// Value of the envelope's `version` field.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Exact number of characters in a device auth code.
pub const AUTH_CODE_LENGTH: usize = 10;

// ── AuthCode ──────────────────────────────────────────────────────

/// A validated device auth code.
///
/// Only constructible with exactly [`AUTH_CODE_LENGTH`] characters, so an
/// envelope can never carry a code the device would reject for length.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AuthCode(String);

impl AuthCode {
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        let len = code.chars().count();
        if len != AUTH_CODE_LENGTH {
            return Err(CleanmateError::InvalidAuthCode(len));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthCode(**********)")
    }
}

impl std::str::FromStr for AuthCode {
    type Err = CleanmateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

// ── Envelope ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Control<'a> {
    #[serde(rename = "authCode")]
    auth_code: &'a str,
}

/// `{"version":"1.0","control":{"authCode":..},"value":..}`
#[derive(Debug, Serialize)]
pub struct Envelope<'a> {
    version: &'static str,
    control: Control<'a>,
    value: &'a CommandPayload,
}

impl<'a> Envelope<'a> {
    pub fn new(auth_code: &'a AuthCode, value: &'a CommandPayload) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            control: Control {
                auth_code: auth_code.as_str(),
            },
            value,
        }
    }

    /// Compact JSON, no whitespace between tokens.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize and frame as a ready-to-send packet.
    pub fn to_packet(&self) -> Result<Packet> {
        Packet::new(self.to_json()?.into_bytes())
    }
}
