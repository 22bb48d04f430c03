// Property registry: the closed set of known device properties, their
// remote spellings, and the value kind each decodes into.
//
// The registry is pure lookup -- no mutable state. Remote names not in the
// registry still round-trip: they decode as raw strings and keep whatever
// `base_type` the server reported.

use std::fmt;

use serde_json::{Value as Json, json};
use tracing::warn;

/// Declared value kind for a registry property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Integer,
    Boolean,
    String,
    /// Value is a URL to a separately fetched file (e.g. a stored map).
    File,
}

/// Known Shark IQ device properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    AreasToClean,
    BatteryCapacity,
    ChargingStatus,
    CleanComplete,
    CleaningStatistics,
    DockedStatus,
    ErrorCode,
    // Dock update frequency (default 20s) is too slow for this to be useful.
    Evacuating,
    FindDevice,
    LowLightMission,
    NavModuleFwVersion,
    OperatingMode,
    PowerMode,
    RechargeResume,
    RechargingToResume,
    RobotFirmwareVersion,
    RobotMap,
    RobotRoomList,
    Rssi,
}

impl Property {
    /// Every registry entry, in declaration order.
    pub const ALL: [Self; 19] = [
        Self::AreasToClean,
        Self::BatteryCapacity,
        Self::ChargingStatus,
        Self::CleanComplete,
        Self::CleaningStatistics,
        Self::DockedStatus,
        Self::ErrorCode,
        Self::Evacuating,
        Self::FindDevice,
        Self::LowLightMission,
        Self::NavModuleFwVersion,
        Self::OperatingMode,
        Self::PowerMode,
        Self::RechargeResume,
        Self::RechargingToResume,
        Self::RobotFirmwareVersion,
        Self::RobotMap,
        Self::RobotRoomList,
        Self::Rssi,
    ];

    /// Remote property name as the Ayla API spells it.
    pub fn name(self) -> &'static str {
        match self {
            Self::AreasToClean => "Areas_To_Clean",
            Self::BatteryCapacity => "Battery_Capacity",
            Self::ChargingStatus => "Charging_Status",
            Self::CleanComplete => "CleanComplete",
            Self::CleaningStatistics => "Cleaning_Statistics",
            Self::DockedStatus => "DockedStatus",
            Self::ErrorCode => "Error_Code",
            Self::Evacuating => "Evacuating",
            Self::FindDevice => "Find_Device",
            Self::LowLightMission => "LowLightMission",
            Self::NavModuleFwVersion => "Nav_Module_FW_Version",
            Self::OperatingMode => "Operating_Mode",
            Self::PowerMode => "Power_Mode",
            Self::RechargeResume => "Recharge_Resume",
            Self::RechargingToResume => "Recharging_To_Resume",
            Self::RobotFirmwareVersion => "Robot_Firmware_Version",
            Self::RobotMap => "Robot_Map",
            Self::RobotRoomList => "Robot_Room_List",
            Self::Rssi => "RSSI",
        }
    }

    /// Declared value kind.
    pub fn kind(self) -> PropertyKind {
        match self {
            Self::AreasToClean
            | Self::CleaningStatistics
            | Self::NavModuleFwVersion
            | Self::RobotFirmwareVersion
            | Self::RobotRoomList => PropertyKind::String,
            Self::BatteryCapacity | Self::ErrorCode | Self::OperatingMode | Self::PowerMode
            | Self::Rssi => PropertyKind::Integer,
            Self::ChargingStatus
            | Self::CleanComplete
            | Self::DockedStatus
            | Self::Evacuating
            | Self::FindDevice
            | Self::LowLightMission
            | Self::RechargeResume
            | Self::RechargingToResume => PropertyKind::Boolean,
            Self::RobotMap => PropertyKind::File,
        }
    }

    /// Reverse lookup from a remote name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl AsRef<str> for Property {
    fn as_ref(&self) -> &str {
        self.name()
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Values ───────────────────────────────────────────────────────────

/// A decoded property value.
///
/// The remote API returns loosely typed JSON; values are decoded into this
/// closed set at the boundary, per the registry's declared kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Int(i64),
    Bool(bool),
    Str(String),
    /// URL of the latest file datapoint for a file-typed property.
    FileRef(String),
}

impl PropertyValue {
    /// Decode a raw JSON value per `kind`. `null` decodes to `None`; a value
    /// the declared kind cannot represent falls back to its raw string form.
    pub(crate) fn decode(kind: PropertyKind, raw: &Json) -> Option<Self> {
        if raw.is_null() {
            return None;
        }
        Some(match kind {
            PropertyKind::Integer => match raw {
                Json::Number(n) => match n.as_i64() {
                    Some(v) => Self::Int(v),
                    None => Self::fallback(kind, raw),
                },
                Json::Bool(b) => Self::Int(i64::from(*b)),
                Json::String(s) => match s.parse() {
                    Ok(v) => Self::Int(v),
                    Err(_) => Self::fallback(kind, raw),
                },
                _ => Self::fallback(kind, raw),
            },
            // Ayla reports booleans as 0/1 integers on most firmware.
            PropertyKind::Boolean => match raw {
                Json::Bool(b) => Self::Bool(*b),
                Json::Number(n) => Self::Bool(n.as_i64().is_some_and(|v| v != 0)),
                Json::String(s) => Self::Bool(s == "1" || s.eq_ignore_ascii_case("true")),
                _ => Self::fallback(kind, raw),
            },
            PropertyKind::String => match raw {
                Json::String(s) => Self::Str(s.clone()),
                other => Self::Str(other.to_string()),
            },
            PropertyKind::File => match raw {
                Json::String(s) => Self::FileRef(s.clone()),
                _ => Self::fallback(kind, raw),
            },
        })
    }

    fn fallback(kind: PropertyKind, raw: &Json) -> Self {
        warn!(?kind, %raw, "property value does not match declared kind");
        match raw {
            Json::String(s) => Self::Str(s.clone()),
            other => Self::Str(other.to_string()),
        }
    }

    /// Encode for a datapoint write. Booleans go out as 0/1 integers, the
    /// form the Ayla API stores them in.
    pub(crate) fn encode(&self) -> Json {
        match self {
            Self::Int(v) => json!(v),
            Self::Bool(b) => json!(i64::from(*b)),
            Self::Str(s) | Self::FileRef(s) => json!(s),
        }
    }

    /// The integer value, if this is an [`Int`](Self::Int).
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The boolean value, if this is a [`Bool`](Self::Bool).
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The string form, if this is a [`Str`](Self::Str) or
    /// [`FileRef`](Self::FileRef).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) | Self::FileRef(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

// ── Modes ────────────────────────────────────────────────────────────

/// Vacuum operating commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    Stop,
    Pause,
    Start,
    /// Return to the charging dock.
    Return,
}

impl OperatingMode {
    /// Encoded wire value.
    pub fn value(self) -> i64 {
        match self {
            Self::Stop => 0,
            Self::Pause => 1,
            Self::Start => 2,
            Self::Return => 3,
        }
    }

    /// Decode a wire value.
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Stop),
            1 => Some(Self::Pause),
            2 => Some(Self::Start),
            3 => Some(Self::Return),
            _ => None,
        }
    }
}

impl From<OperatingMode> for PropertyValue {
    fn from(mode: OperatingMode) -> Self {
        Self::Int(mode.value())
    }
}

/// Vacuum suction power modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    Normal,
    Eco,
    Max,
}

impl PowerMode {
    /// Encoded wire value.
    pub fn value(self) -> i64 {
        match self {
            Self::Normal => 0,
            Self::Eco => 1,
            Self::Max => 2,
        }
    }

    /// Decode a wire value.
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Normal),
            1 => Some(Self::Eco),
            2 => Some(Self::Max),
            _ => None,
        }
    }
}

impl From<PowerMode> for PropertyValue {
    fn from(mode: PowerMode) -> Self {
        Self::Int(mode.value())
    }
}

// ── Error codes ──────────────────────────────────────────────────────

/// Human-readable message for a device error code.
///
/// The table tracks the codes the vendor app displays; anything else is
/// unknown.
pub fn error_message(code: i64) -> Option<&'static str> {
    match code {
        1 => Some("Side wheel is stuck"),
        2 => Some("Side brush is stuck"),
        3 => Some("Suction motor failed"),
        4 => Some("Brushroll stuck"),
        5 => Some("Side wheel is stuck (2)"),
        6 => Some("Bumper is stuck"),
        7 => Some("Cliff sensor is blocked"),
        8 => Some("Battery power is low"),
        9 => Some("No Dustbin"),
        10 => Some("Fall sensor is blocked"),
        11 => Some("Front wheel is stuck"),
        13 => Some("Switched off"),
        14 => Some("Magnetic strip error"),
        16 => Some("Top bumper is stuck"),
        18 => Some("Wheel encoder error"),
        _ => None,
    }
}
