// Room-list parsing and the encoded payload for room-scoped cleaning.
//
// `Robot_Room_List` is a colon-separated string: the map identifier first,
// then one entry per room. Room-scoped starts write a framed, base64-encoded
// subset of that list to `Areas_To_Clean`.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

/// Parsed `Robot_Room_List` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomList {
    /// Ties the room names to the map currently stored on the robot.
    pub identifier: String,
    /// Room names, in the order the device reports them.
    pub rooms: Vec<String>,
}

impl RoomList {
    /// Parse the raw property value (`identifier:Room1:Room2:...`).
    pub(crate) fn parse(raw: &str) -> Self {
        let mut parts = raw.split(':');
        let identifier = parts.next().unwrap_or_default().to_owned();
        Self {
            identifier,
            rooms: parts.map(str::to_owned).collect(),
        }
    }

    /// Whether `room` appears in the device's room list.
    pub fn contains(&self, room: &str) -> bool {
        self.rooms.iter().any(|r| r == room)
    }
}

/// Build the `Areas_To_Clean` payload for a room subset.
///
/// Frame layout, matching what the mobile app sends:
///
/// ```text
/// 80 01 0b ca 02    control preamble
/// <len> 0a          remaining length, then a newline
/// <len> <room> ...  length-prefixed room names, joined by 0a
/// 1a <len> <id>     map identifier trailer
/// ```
///
/// The whole frame is base64-encoded for transport as a string property.
pub(crate) fn encode_room_payload(rooms: &[&str], identifier: &str) -> String {
    let mut body: Vec<u8> = Vec::new();
    for (i, room) in rooms.iter().enumerate() {
        if i > 0 {
            body.push(b'\n');
        }
        body.push(u8::try_from(room.len()).unwrap_or(u8::MAX));
        body.extend_from_slice(room.as_bytes());
    }

    let mut trailer: Vec<u8> = vec![0x1a, u8::try_from(identifier.len()).unwrap_or(u8::MAX)];
    trailer.extend_from_slice(identifier.as_bytes());

    let mut frame: Vec<u8> = vec![0x80, 0x01, 0x0b, 0xca, 0x02];
    frame.push(u8::try_from(1 + body.len() + trailer.len()).unwrap_or(u8::MAX));
    frame.push(b'\n');
    frame.extend_from_slice(&body);
    frame.extend_from_slice(&trailer);

    BASE64.encode(frame)
}
