use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::{as_int, as_text};

/// Key of the room list in a map response.
const ROOMS_KEY: &str = "regionNames";
/// Keys inside each room entry.
const ROOM_ID_KEY: &str = "regionNum";
const ROOM_NAME_KEY: &str = "regionName";
const CHARGER_KEY: &str = "chargerPos";
const ROBOT_KEY: &str = "robotPos";

/// A point in map coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    /// Accepts `[x, y]` (what `"x,y"` coerces to) or `{"x": .., "y": ..}`.
    fn from_value(value: &Value) -> Option<Self> {
        let (x, y) = match value {
            Value::Array(items) if items.len() >= 2 => (&items[0], &items[1]),
            Value::Object(fields) => (fields.get("x")?, fields.get("y")?),
            _ => return None,
        };
        Some(Self {
            x: as_int(x)?,
            y: as_int(y)?,
        })
    }
}

/// A named cleaning zone. `id` is what `clean_rooms` takes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    pub id: u32,
    pub name: String,
}

impl Room {
    fn from_value(value: &Value) -> Option<Self> {
        let id = value
            .get(ROOM_ID_KEY)
            .and_then(as_int)
            .and_then(|n| u32::try_from(n).ok())?;
        let name = value
            .get(ROOM_NAME_KEY)
            .and_then(as_text)
            .map(|raw| decode_room_name(&raw))
            .unwrap_or_default();
        Some(Self { id, name })
    }
}

/// Room names arrive base64-encoded. Text that does not decode to UTF-8
/// is kept as received.
fn decode_room_name(raw: &str) -> String {
    match BASE64.decode(raw) {
        Ok(bytes) => String::from_utf8(bytes).unwrap_or_else(|_| {
            warn!(name = raw, "room name is not utf-8 after base64 decoding");
            raw.to_owned()
        }),
        Err(err) => {
            warn!(name = raw, %err, "room name is not base64");
            raw.to_owned()
        }
    }
}

/// Rooms and positions from the latest map query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapState {
    rooms: Vec<Room>,
    charger_position: Option<Position>,
    robot_position: Option<Position>,
}

impl MapState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rooms in the order the device lists them.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, id: u32) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == id)
    }

    pub fn charger_position(&self) -> Option<Position> {
        self.charger_position
    }

    pub fn robot_position(&self) -> Option<Position> {
        self.robot_position
    }

    /// Apply the `value` object of a map response.
    ///
    /// Each present key replaces its field wholesale. Returns the number
    /// of fields that were updated.
    pub fn apply_map_update(&mut self, value: &Value) -> usize {
        let Some(fields) = value.as_object() else {
            warn!("map update is not an object; ignoring");
            return 0;
        };
        let mut applied = 0;

        if let Some(raw) = fields.get(ROOMS_KEY) {
            let entries: &[Value] = match raw {
                Value::Array(entries) => entries.as_slice(),
                single @ Value::Object(_) => std::slice::from_ref(single),
                _ => &[],
            };
            let mut rooms = Vec::with_capacity(entries.len());
            for entry in entries {
                match Room::from_value(entry) {
                    Some(room) => rooms.push(room),
                    None => warn!(field = ROOMS_KEY, %entry, "ignoring malformed room"),
                }
            }
            self.rooms = rooms;
            applied += 1;
        }

        for (key, slot) in [
            (CHARGER_KEY, &mut self.charger_position),
            (ROBOT_KEY, &mut self.robot_position),
        ] {
            if let Some(raw) = fields.get(key) {
                match Position::from_value(raw) {
                    Some(position) => {
                        *slot = Some(position);
                        applied += 1;
                    }
                    None => warn!(field = key, %raw, "ignoring malformed position"),
                }
            }
        }

        applied
    }
}
