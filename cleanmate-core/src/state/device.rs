use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::{as_bool, as_int, as_text};
use crate::message::{ErrorCode, MopMode, WorkMode, WorkState};
use crate::protocol::volume_percent;

/// Battery, modes and activity as last reported by the device.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceState {
    battery_level: Option<u8>,
    firmware_version: Option<String>,
    work_mode: WorkMode,
    work_state: WorkState,
    had_work: bool,
    mop_mode: MopMode,
    volume: Option<u8>,
    error_code: Option<i64>,
}

impl DeviceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Battery charge, 0–100.
    pub fn battery_level(&self) -> Option<u8> {
        self.battery_level
    }

    pub fn firmware_version(&self) -> Option<&str> {
        self.firmware_version.as_deref()
    }

    pub fn work_mode(&self) -> WorkMode {
        self.work_mode
    }

    pub fn work_state(&self) -> WorkState {
        self.work_state
    }

    /// `true` when an interrupted job is pending, which makes an idle
    /// robot paused rather than finished.
    pub fn had_work(&self) -> bool {
        self.had_work
    }

    pub fn mop_mode(&self) -> MopMode {
        self.mop_mode
    }

    /// Voice volume on the 0–100 scale accepted by `set_volume`.
    pub fn volume(&self) -> Option<u8> {
        self.volume
    }

    /// Raw device error code; `None` when the device reports no error.
    pub fn error_code(&self) -> Option<i64> {
        self.error_code
    }

    /// The error code as a known fault, if it is one.
    pub fn fault(&self) -> Option<ErrorCode> {
        self.error_code
            .map(ErrorCode::from_code)
            .filter(|code| *code != ErrorCode::Unknown)
    }

    /// Apply the `value` object of a state response.
    ///
    /// Returns the number of fields that were updated.
    pub fn apply_state_update(&mut self, value: &Value) -> usize {
        let Some(fields) = value.as_object() else {
            warn!("state update is not an object; ignoring");
            return 0;
        };
        let mut applied = 0;

        if let Some(raw) = fields.get("battery") {
            match as_int(raw).and_then(|n| u8::try_from(n).ok()).filter(|n| *n <= 100) {
                Some(level) => {
                    self.battery_level = Some(level);
                    applied += 1;
                }
                None => warn!(field = "battery", %raw, "ignoring malformed field"),
            }
        }

        if let Some(raw) = fields.get("version") {
            match as_text(raw) {
                Some(version) => {
                    self.firmware_version = Some(version);
                    applied += 1;
                }
                None => warn!(field = "version", %raw, "ignoring malformed field"),
            }
        }

        if let Some(raw) = fields.get("workMode") {
            self.work_mode = as_int(raw).map_or(WorkMode::Unknown, WorkMode::from_code);
            applied += 1;
        }

        if let Some(raw) = fields.get("workState") {
            self.work_state = as_int(raw).map_or(WorkState::Unknown, WorkState::from_code);
            applied += 1;
        }

        if let Some(raw) = fields.get("waterTank") {
            self.mop_mode = as_int(raw).map_or(MopMode::Unknown, MopMode::from_code);
            applied += 1;
        }

        if let Some(raw) = fields.get("extParam").and_then(|ext| ext.get("hadWork")) {
            match as_bool(raw) {
                Some(had_work) => {
                    self.had_work = had_work;
                    applied += 1;
                }
                None => warn!(field = "extParam.hadWork", %raw, "ignoring malformed field"),
            }
        }

        if let Some(raw) = fields.get("volume") {
            match raw.as_f64().and_then(volume_percent) {
                Some(volume) => {
                    self.volume = Some(volume);
                    applied += 1;
                }
                None => warn!(field = "volume", %raw, "ignoring malformed field"),
            }
        }

        if let Some(raw) = fields.get("error") {
            match as_int(raw) {
                Some(code) => {
                    self.error_code = (code != 0).then_some(code);
                    applied += 1;
                }
                None => warn!(field = "error", %raw, "ignoring malformed field"),
            }
        }

        applied
    }
}
