//! Operation selectors and device enumerations.
//!
//! Device enums decode with `TryFrom<i64>`, which reports
//! [`CleanmateError::UnknownVariant`], and `from_code`, which logs that
//! error and falls back to `Unknown` so one odd value never fails a
//! whole state update.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::CleanmateError;

// ── TransitCmd ───────────────────────────────────────────────────

/// Numeric operation selector carried as `transitCmd` in a command body.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitCmd {
    /// Query battery, modes and work state.
    GetState = 98,
    /// Start cleaning with the current mode.
    Start = 100,
    /// Stop or pause, depending on `isStop`.
    Halt = 102,
    /// Return to the charging dock.
    Charge = 104,
    /// Start cleaning with a given work mode.
    StartWithMode = 106,
    /// Set the voice volume.
    SetVolume = 123,
    /// Query the map.
    GetMap = 133,
    /// Play the locate sound.
    Find = 143,
    /// Set the water tank (mop) level.
    SetMopMode = 145,
}

impl TransitCmd {
    pub fn code(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for TransitCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Sent as a string, like every other value the device accepts.
impl Serialize for TransitCmd {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl TryFrom<i64> for TransitCmd {
    type Error = CleanmateError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            98 => Ok(TransitCmd::GetState),
            100 => Ok(TransitCmd::Start),
            102 => Ok(TransitCmd::Halt),
            104 => Ok(TransitCmd::Charge),
            106 => Ok(TransitCmd::StartWithMode),
            123 => Ok(TransitCmd::SetVolume),
            133 => Ok(TransitCmd::GetMap),
            143 => Ok(TransitCmd::Find),
            145 => Ok(TransitCmd::SetMopMode),
            _ => Err(unknown("TransitCmd", value)),
        }
    }
}

/// String operation selector carried as `opCmd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OpCmd {
    #[serde(rename = "cleanBlocks")]
    CleanBlocks,
}

// ── Device enums ─────────────────────────────────────────────────

/// Shared decoding for device enums with an `Unknown` fallback.
macro_rules! device_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $( $(#[$vmeta:meta])* $variant:ident = $code:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Not reported yet, or a value outside the known set.
            #[default]
            Unknown,
        }

        impl $name {
            /// The device's numeric code, `None` for `Unknown`.
            pub fn code(self) -> Option<i64> {
                match self {
                    $( Self::$variant => Some($code), )+
                    Self::Unknown => None,
                }
            }

            /// Decode a device value, logging and mapping misses to `Unknown`.
            pub fn from_code(value: i64) -> Self {
                Self::try_from(value).unwrap_or_else(|err| {
                    tracing::warn!("{err}; treating as Unknown");
                    Self::Unknown
                })
            }
        }

        impl TryFrom<i64> for $name {
            type Error = CleanmateError;

            fn try_from(value: i64) -> Result<Self, CleanmateError> {
                match value {
                    $( $code => Ok(Self::$variant), )+
                    _ => Err(unknown(stringify!($name), value)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }
    };
}

device_enum! {
    /// Cleaning intensity (suction power).
    WorkMode {
        Intensive = 7,
        Standard = 1,
        Silent = 9,
    }
}

device_enum! {
    /// What the robot is currently doing.
    WorkState {
        Cleaning = 1,
        Idle = 2,
        Returning = 4,
        Charging = 5,
        /// On the dock but not charging. Code 6 is inferred from the
        /// gap in the known codes and has not been seen in device traffic.
        Docked = 6,
        Error = 7,
        Problem = 9,
    }
}

device_enum! {
    /// Water tank flow while mopping.
    MopMode {
        High = 20,
        Medium = 40,
        Low = 60,
    }
}

device_enum! {
    /// Fault codes with a known meaning.
    ErrorCode {
        /// Wheels or brush blocked.
        Stuck = 106,
        /// The robot lost track of its position on the map.
        LocalizationFailed = 119,
    }
}

fn unknown(type_name: &'static str, value: i64) -> CleanmateError {
    CleanmateError::UnknownVariant { type_name, value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transit_cmd_roundtrip() {
        let cmds = [
            TransitCmd::GetState,
            TransitCmd::Start,
            TransitCmd::Halt,
            TransitCmd::Charge,
            TransitCmd::StartWithMode,
            TransitCmd::SetVolume,
            TransitCmd::GetMap,
            TransitCmd::Find,
            TransitCmd::SetMopMode,
        ];
        for cmd in cmds {
            assert_eq!(TransitCmd::try_from(cmd.code() as i64).unwrap(), cmd);
        }
        assert!(TransitCmd::try_from(99).is_err());
    }

    #[test]
    fn transit_cmd_serializes_as_string() {
        assert_eq!(serde_json::to_string(&TransitCmd::GetMap).unwrap(), "\"133\"");
        assert_eq!(serde_json::to_string(&OpCmd::CleanBlocks).unwrap(), "\"cleanBlocks\"");
    }

    #[test]
    fn known_codes_decode() {
        assert_eq!(WorkMode::from_code(7), WorkMode::Intensive);
        assert_eq!(WorkState::from_code(5), WorkState::Charging);
        assert_eq!(MopMode::from_code(40), MopMode::Medium);
        assert_eq!(ErrorCode::from_code(119), ErrorCode::LocalizationFailed);
        assert_eq!(MopMode::Low.code(), Some(60));
    }

    #[test]
    fn work_state_decodes_every_code() {
        let decoded: Vec<WorkState> = [1, 2, 4, 5, 6, 7, 9]
            .into_iter()
            .map(WorkState::from_code)
            .collect();
        assert_eq!(
            decoded,
            [
                WorkState::Cleaning,
                WorkState::Idle,
                WorkState::Returning,
                WorkState::Charging,
                WorkState::Docked,
                WorkState::Error,
                WorkState::Problem,
            ]
        );
        assert_eq!(WorkState::Error.code(), Some(7));
        assert!(matches!(
            WorkState::try_from(3),
            Err(CleanmateError::UnknownVariant { type_name: "WorkState", value: 3 })
        ));
    }

    #[test]
    fn unknown_codes_fall_back() {
        assert_eq!(WorkMode::from_code(3), WorkMode::Unknown);
        assert_eq!(WorkState::from_code(-1), WorkState::Unknown);
        assert_eq!(WorkMode::Unknown.code(), None);
        assert!(matches!(
            MopMode::try_from(30),
            Err(CleanmateError::UnknownVariant { type_name: "MopMode", value: 30 })
        ));
    }
}
