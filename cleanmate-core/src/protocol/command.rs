//! One payload shape per device operation.
//!
//! Field order inside each variant follows the device's own app traffic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CleanmateError, Result};
use crate::message::{MopMode, OpCmd, TransitCmd, WorkMode};

// ── CommandPayload ────────────────────────────────────────────────

/// The `value` object of an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum CommandPayload {
    GetState {
        state: &'static str,
        transit_cmd: TransitCmd,
    },
    GetMap {
        map_width: &'static str,
        center_point: &'static str,
        map_height: &'static str,
        track_num: &'static str,
        map_sign: &'static str,
        transit_cmd: TransitCmd,
    },
    Start {
        start: &'static str,
        transit_cmd: TransitCmd,
    },
    StartWithMode {
        mode: String,
        transit_cmd: TransitCmd,
    },
    Stop {
        stop: &'static str,
        is_stop: &'static str,
        transit_cmd: TransitCmd,
    },
    Pause {
        pause: &'static str,
        is_stop: &'static str,
        transit_cmd: TransitCmd,
    },
    Charge {
        charge: &'static str,
        transit_cmd: TransitCmd,
    },
    SetMopMode {
        water_tank: String,
        transit_cmd: TransitCmd,
    },
    SetVolume {
        volume: String,
        voice: &'static str,
        transit_cmd: TransitCmd,
    },
    CleanRooms {
        op_cmd: OpCmd,
        clean_blocks: Vec<CleanBlock>,
    },
    Find {
        find: &'static str,
        transit_cmd: TransitCmd,
    },
}

impl CommandPayload {
    pub fn get_state() -> Self {
        Self::GetState {
            state: "",
            transit_cmd: TransitCmd::GetState,
        }
    }

    pub fn get_map() -> Self {
        Self::GetMap {
            map_width: "0",
            center_point: "0",
            map_height: "0",
            track_num: "AAA=",
            map_sign: "AAA=",
            transit_cmd: TransitCmd::GetMap,
        }
    }

    /// Start cleaning, optionally switching work mode first.
    pub fn start(mode: Option<WorkMode>) -> Result<Self> {
        match mode {
            None => Ok(Self::Start {
                start: "1",
                transit_cmd: TransitCmd::Start,
            }),
            Some(mode) => {
                let code = mode.code().ok_or_else(|| {
                    CleanmateError::InvalidArgument("cannot start in Unknown work mode".into())
                })?;
                Ok(Self::StartWithMode {
                    mode: code.to_string(),
                    transit_cmd: TransitCmd::StartWithMode,
                })
            }
        }
    }

    pub fn stop() -> Self {
        Self::Stop {
            stop: "1",
            is_stop: "1",
            transit_cmd: TransitCmd::Halt,
        }
    }

    pub fn pause() -> Self {
        Self::Pause {
            pause: "1",
            is_stop: "0",
            transit_cmd: TransitCmd::Halt,
        }
    }

    pub fn charge() -> Self {
        Self::Charge {
            charge: "1",
            transit_cmd: TransitCmd::Charge,
        }
    }

    pub fn set_mop_mode(mode: MopMode) -> Result<Self> {
        let code = mode
            .code()
            .ok_or_else(|| CleanmateError::InvalidArgument("cannot set Unknown mop mode".into()))?;
        Ok(Self::SetMopMode {
            water_tank: code.to_string(),
            transit_cmd: TransitCmd::SetMopMode,
        })
    }

    /// `volume` is on the public 0–100 scale.
    pub fn set_volume(volume: u8) -> Result<Self> {
        Ok(Self::SetVolume {
            volume: device_volume(volume)?,
            voice: "",
            transit_cmd: TransitCmd::SetVolume,
        })
    }

    pub fn clean_rooms(rooms: &[RoomCleaning]) -> Result<Self> {
        if rooms.is_empty() {
            return Err(CleanmateError::InvalidArgument("no rooms to clean".into()));
        }
        Ok(Self::CleanRooms {
            op_cmd: OpCmd::CleanBlocks,
            clean_blocks: clean_blocks(rooms),
        })
    }

    pub fn find() -> Self {
        Self::Find {
            find: "",
            transit_cmd: TransitCmd::Find,
        }
    }

    /// The numeric selector, `None` for `opCmd` payloads.
    pub fn transit_cmd(&self) -> Option<TransitCmd> {
        match self {
            Self::GetState { transit_cmd, .. }
            | Self::GetMap { transit_cmd, .. }
            | Self::Start { transit_cmd, .. }
            | Self::StartWithMode { transit_cmd, .. }
            | Self::Stop { transit_cmd, .. }
            | Self::Pause { transit_cmd, .. }
            | Self::Charge { transit_cmd, .. }
            | Self::SetMopMode { transit_cmd, .. }
            | Self::SetVolume { transit_cmd, .. }
            | Self::Find { transit_cmd, .. } => Some(*transit_cmd),
            Self::CleanRooms { .. } => None,
        }
    }

    /// Queries get a response body back; commands do not.
    pub fn expects_response(&self) -> bool {
        matches!(self, Self::GetState { .. } | Self::GetMap { .. })
    }
}

// ── Volume ────────────────────────────────────────────────────────

/// Map 0–100 onto the device's 1.0–2.0 scale in steps of 0.1.
///
/// Ties round to even (`5` → `1.0`, `15` → `1.2`), and the result
/// always keeps one decimal (`"1.0"`, not `"1"`).
pub fn device_volume(volume: u8) -> Result<String> {
    if volume > 100 {
        return Err(CleanmateError::InvalidArgument(format!(
            "volume {volume} outside 0-100"
        )));
    }
    let steps = ((f64::from(volume) / 100.0) * 10.0).round_ties_even();
    Ok(format!("{:.1}", 1.0 + steps / 10.0))
}

/// Inverse of [`device_volume`] for levels the device reports.
pub fn volume_percent(level: f64) -> Option<u8> {
    if !(1.0..=2.0).contains(&level) {
        return None;
    }
    Some(((level - 1.0) * 100.0).round() as u8)
}

// ── Rooms ─────────────────────────────────────────────────────────

/// A room to clean and how many passes to make over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomCleaning {
    pub room_id: u32,
    pub clean_num: u32,
}

impl RoomCleaning {
    /// A single pass over `room_id`.
    pub fn once(room_id: u32) -> Self {
        Self {
            room_id,
            clean_num: 1,
        }
    }
}

/// Wire form of one room in a `cleanBlocks` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanBlock {
    pub clean_num: String,
    pub block_num: String,
}

/// One block per room id, the last entry for an id winning, ordered by
/// the block number's decimal text (`"10"` sorts before `"2"`).
pub fn clean_blocks(rooms: &[RoomCleaning]) -> Vec<CleanBlock> {
    let mut by_block: BTreeMap<String, String> = BTreeMap::new();
    for room in rooms {
        by_block.insert(room.room_id.to_string(), room.clean_num.to_string());
    }
    by_block
        .into_iter()
        .map(|(block_num, clean_num)| CleanBlock {
            clean_num,
            block_num,
        })
        .collect()
}
