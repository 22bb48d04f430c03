// Per-device handle: property table, datapoint writes, and the convenience
// operations built on top of them.
//
// There is no state machine here beyond "the property table has been
// fetched or it hasn't". Every operation is one or two HTTP calls routed
// through the shared client.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::debug;

use crate::client::AylaClient;
use crate::error::Error;
use crate::models::{
    Datapoint, DatapointWrapper, DatumWrapper, DeviceRecord, MobileData, PropertyWrapper,
    parse_timestamp,
};
use crate::properties::{
    OperatingMode, PowerMode, Property, PropertyKind, PropertyValue, error_message,
};
use crate::rooms::{RoomList, encode_room_payload};

/// One entry in a device's property table.
///
/// Overwritten wholesale by a full [`SharkVacuum::update`]; a partial update
/// merges in only the named entries.
#[derive(Debug, Clone, Default)]
pub struct PropertyState {
    /// Decoded value; `None` until the device has reported one.
    pub value: Option<PropertyValue>,
    /// Numeric property id used by datapoint-scoped endpoints.
    pub remote_key: Option<i64>,
    /// Value type as the server reports it (`integer`, `boolean`, `file`, ...).
    pub base_type: Option<String>,
    pub read_only: bool,
    /// Server-side timestamp of the last datapoint.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Handle for one Shark IQ vacuum.
///
/// Holds a read-only reference to the [`AylaClient`] (never the token
/// itself) and a local property table that mirrors the device's state as of
/// the last [`update`](Self::update).
pub struct SharkVacuum {
    api: Arc<AylaClient>,
    record: DeviceRecord,
    vac_model_number: Option<String>,
    vac_serial_number: Option<String>,
    properties: HashMap<String, PropertyState>,
    settable: HashSet<String>,
}

impl SharkVacuum {
    pub(crate) fn new(api: Arc<AylaClient>, record: DeviceRecord) -> Self {
        Self {
            api,
            record,
            vac_model_number: None,
            vac_serial_number: None,
            properties: HashMap::new(),
            settable: HashSet::new(),
        }
    }

    // ── Identity ─────────────────────────────────────────────────────

    /// Display name the account gave the device.
    pub fn name(&self) -> &str {
        &self.record.product_name
    }

    /// Device serial number (DSN).
    pub fn serial_number(&self) -> &str {
        &self.record.dsn
    }

    /// Model number of the OEM platform.
    pub fn oem_model_number(&self) -> &str {
        &self.record.oem_model
    }

    /// Vacuum model number, populated by [`get_metadata`](Self::get_metadata).
    pub fn vac_model_number(&self) -> Option<&str> {
        self.vac_model_number.as_deref()
    }

    /// Vacuum serial number, populated by [`get_metadata`](Self::get_metadata).
    pub fn vac_serial_number(&self) -> Option<&str> {
        self.vac_serial_number.as_deref()
    }

    /// The raw directory record this handle was built from.
    pub fn device(&self) -> &DeviceRecord {
        &self.record
    }

    // ── Property table ───────────────────────────────────────────────

    /// Fetch current values for `names`, or for every device property when
    /// `None`, and fold them into the local table.
    ///
    /// `GET /apiv1/dsns/{dsn}/properties.json`. A full update replaces the
    /// table wholesale; a partial update merges. On failure the previous
    /// table is left untouched.
    pub async fn update(&mut self, names: Option<&[&str]>) -> Result<(), Error> {
        let url = self
            .api
            .device_endpoint(&format!("/apiv1/dsns/{}/properties.json", self.record.dsn))?;
        let query: Vec<(&str, &str)> = names
            .unwrap_or_default()
            .iter()
            .map(|name| ("names[]", *name))
            .collect();

        let wrappers: Vec<PropertyWrapper> = self.api.get_json(url, &query).await?;
        self.apply_update(names.is_none(), wrappers);
        Ok(())
    }

    /// Fold fetched records into the table.
    ///
    /// The device exposes command channels as `SET_`-prefixed twins of the
    /// readable properties; both collapse onto the prefix-stripped name,
    /// with the readable record winning when both appear.
    fn apply_update(&mut self, full: bool, wrappers: Vec<PropertyWrapper>) {
        if full {
            self.properties.clear();
            self.settable.clear();
        }

        for wrapper in wrappers {
            let record = wrapper.property;
            let is_set_channel = record
                .name
                .get(..4)
                .is_some_and(|p| p.eq_ignore_ascii_case("SET_"));
            let name = clean_property_name(&record.name).to_owned();

            if is_set_channel {
                self.settable.insert(name.clone());
                if self.properties.contains_key(&name) {
                    continue;
                }
            }

            let kind = declared_kind(&name, record.base_type.as_deref());
            self.properties.insert(
                name,
                PropertyState {
                    value: PropertyValue::decode(kind, &record.value),
                    remote_key: record.key,
                    base_type: record.base_type,
                    read_only: record.read_only,
                    updated_at: record.data_updated_at.as_deref().and_then(parse_timestamp),
                },
            );
        }
    }

    /// Read a property's decoded value from the local table.
    pub fn get_property_value(&self, name: impl AsRef<str>) -> Option<PropertyValue> {
        self.properties
            .get(name.as_ref())
            .and_then(|state| state.value.clone())
    }

    /// Full table entry for a property, if it has been fetched.
    pub fn property_state(&self, name: impl AsRef<str>) -> Option<&PropertyState> {
        self.properties.get(name.as_ref())
    }

    /// Property names the device accepts writes for, per the last update.
    pub fn settable_properties(&self) -> impl Iterator<Item = &str> {
        self.settable.iter().map(String::as_str)
    }

    /// Write one property and optimistically update the cached value.
    ///
    /// `POST /apiv1/dsns/{dsn}/properties/SET_{name}/datapoints.json`. The
    /// cache is only touched after the write succeeds; a failed write leaves
    /// the previous value in place.
    ///
    /// A property whose record is read-only and has no `SET_` command
    /// channel is rejected without a request.
    pub async fn set_property_value(
        &mut self,
        name: impl AsRef<str>,
        value: impl Into<PropertyValue>,
    ) -> Result<(), Error> {
        let name = name.as_ref();
        let value = value.into();

        if self.properties.get(name).is_some_and(|p| p.read_only)
            && !self.settable.contains(name)
        {
            return Err(Error::ReadOnlyProperty {
                property: name.to_owned(),
            });
        }

        let url = self.api.device_endpoint(&format!(
            "/apiv1/dsns/{}/properties/SET_{name}/datapoints.json",
            self.record.dsn
        ))?;
        debug!(property = name, "writing datapoint");

        let body = json!({ "datapoint": { "value": value.encode() } });
        let resp: Option<DatapointWrapper> = self.api.post_json_opt(url, &body).await?;

        let entry = self.properties.entry(name.to_owned()).or_default();
        entry.value = Some(value);
        if let Some(ts) = resp
            .and_then(|w| w.datapoint)
            .and_then(|d| d.updated_at)
            .as_deref()
            .and_then(parse_timestamp)
        {
            entry.updated_at = Some(ts);
        }
        Ok(())
    }

    // ── Convenience operations ───────────────────────────────────────

    /// Issue an operating-mode command (start, stop, pause, return to dock).
    pub async fn set_operating_mode(&mut self, mode: OperatingMode) -> Result<(), Error> {
        self.set_property_value(Property::OperatingMode, mode).await
    }

    /// Select a suction power mode.
    pub async fn set_power_mode(&mut self, mode: PowerMode) -> Result<(), Error> {
        self.set_property_value(Property::PowerMode, mode).await
    }

    /// Make the device chirp audibly so it can be located.
    pub async fn find_device(&mut self) -> Result<(), Error> {
        self.set_property_value(Property::FindDevice, true).await
    }

    /// Last reported error code, or `None` when the device reports none.
    ///
    /// The vendor API does not promptly clear this once the underlying
    /// condition resolves, so the value can be stale.
    pub fn error_code(&self) -> Option<i64> {
        self.get_property_value(Property::ErrorCode)?.as_int()
    }

    /// Human-readable form of [`error_code`](Self::error_code); carries the
    /// same staleness caveat.
    pub fn error_text(&self) -> Option<String> {
        let code = self.error_code()?;
        if code == 0 {
            return None;
        }
        Some(error_message(code).map_or_else(|| format!("Unknown error ({code})"), str::to_owned))
    }

    // ── Metadata ─────────────────────────────────────────────────────

    /// Fetch device metadata. Not needed for basic operation.
    ///
    /// `GET /apiv1/dsns/{dsn}/data.json`. The vendor packs the vacuum model
    /// and serial numbers into a single JSON-encoded datum value.
    pub async fn get_metadata(&mut self) -> Result<(), Error> {
        let url = self
            .api
            .device_endpoint(&format!("/apiv1/dsns/{}/data.json", self.record.dsn))?;
        let wrappers: Vec<DatumWrapper> = self.api.get_json(url, &[]).await?;

        if let Some(datum) = wrappers
            .into_iter()
            .filter_map(|w| w.datum)
            .find(|d| d.key == "sharkDeviceMobileData")
        {
            let data: MobileData = serde_json::from_str(&datum.value).unwrap_or_default();
            self.vac_model_number = data.vac_model_number;
            self.vac_serial_number = data.vac_serial_number;
        }
        Ok(())
    }

    // ── File properties ──────────────────────────────────────────────

    /// Numeric property id for a file-typed property, without touching the
    /// network.
    ///
    /// Registry-known properties are checked against their declared kind;
    /// pass-through names fall back to the `base_type` the server reported
    /// on the last update. `Ok(None)` means the property has not been
    /// fetched yet, so its id is unknown.
    fn file_property_key(&self, name: &str) -> Result<Option<i64>, Error> {
        if let Some(property) = Property::from_name(name) {
            if property.kind() != PropertyKind::File {
                return Err(Error::PropertyType {
                    property: name.to_owned(),
                });
            }
        } else if let Some(state) = self.properties.get(name) {
            if state.base_type.as_deref() != Some("file") {
                return Err(Error::PropertyType {
                    property: name.to_owned(),
                });
            }
        }
        Ok(self.properties.get(name).and_then(|p| p.remote_key))
    }

    /// Resolve the download URL of the most recent file datapoint.
    ///
    /// File properties are versioned, so the lookup walks
    /// `GET /apiv1/properties/{key}/datapoints.json` and picks the newest
    /// entry. `Ok(None)` when the property has no datapoints yet or has not
    /// been fetched into the table.
    pub async fn get_file_property_url(
        &self,
        name: impl AsRef<str>,
    ) -> Result<Option<String>, Error> {
        let name = name.as_ref();
        let Some(key) = self.file_property_key(name)? else {
            return Ok(None);
        };

        let url = self
            .api
            .device_endpoint(&format!("/apiv1/properties/{key}/datapoints.json"))?;
        let wrappers: Vec<DatapointWrapper> = self.api.get_json(url, &[]).await?;
        Ok(most_recent_datapoint(wrappers).and_then(|d| d.file))
    }

    /// Download the most recent file for a file-typed property.
    ///
    /// The datapoint URL is pre-signed, so the content fetch itself is
    /// unauthenticated.
    pub async fn get_file_property(&self, name: impl AsRef<str>) -> Result<Option<Bytes>, Error> {
        let Some(url) = self.get_file_property_url(name).await? else {
            return Ok(None);
        };
        debug!("fetching file property content");

        let resp = self
            .api
            .http()
            .get(url)
            .send()
            .await
            .map_err(Error::Transport)?
            .error_for_status()
            .map_err(Error::Transport)?;
        Ok(Some(resp.bytes().await.map_err(Error::Transport)?))
    }

    // ── Rooms ────────────────────────────────────────────────────────

    /// Rooms known to the device's current map, from the last update.
    ///
    /// `None` until `Robot_Room_List` has been fetched into the table.
    pub fn get_room_list(&self) -> Option<RoomList> {
        match self.get_property_value(Property::RobotRoomList)? {
            PropertyValue::Str(raw) => Some(RoomList::parse(&raw)),
            _ => None,
        }
    }

    /// Start a clean scoped to `rooms`; an empty slice cleans everywhere.
    ///
    /// Every name must exist in the device's current room list. An unknown
    /// name fails with [`Error::UnknownRoom`] before any write goes out.
    pub async fn clean_rooms(&mut self, rooms: &[&str]) -> Result<(), Error> {
        let payload = if rooms.is_empty() {
            "*".to_owned()
        } else {
            let Some(list) = self.get_room_list() else {
                return Err(Error::UnknownRoom {
                    room: rooms[0].to_owned(),
                });
            };
            if let Some(missing) = rooms.iter().find(|room| !list.contains(room)) {
                return Err(Error::UnknownRoom {
                    room: (*missing).to_owned(),
                });
            }
            debug!(identifier = %list.identifier, "encoding room payload");
            encode_room_payload(rooms, &list.identifier)
        };

        self.set_property_value(Property::AreasToClean, payload)
            .await?;
        self.set_operating_mode(OperatingMode::Start).await
    }
}

/// Strip the `GET_`/`SET_` channel prefix from a raw property name.
fn clean_property_name(raw: &str) -> &str {
    match raw.get(..4) {
        Some(prefix)
            if prefix.eq_ignore_ascii_case("SET_") || prefix.eq_ignore_ascii_case("GET_") =>
        {
            &raw[4..]
        }
        _ => raw,
    }
}

/// Decode kind for a property: the registry's declared kind for known
/// names; pass-through names stay raw strings, except server-declared file
/// properties.
fn declared_kind(name: &str, base_type: Option<&str>) -> PropertyKind {
    match Property::from_name(name) {
        Some(property) => property.kind(),
        None if base_type == Some("file") => PropertyKind::File,
        None => PropertyKind::String,
    }
}

/// Newest datapoint by server timestamp; entries without one are skipped.
fn most_recent_datapoint(wrappers: Vec<DatapointWrapper>) -> Option<Datapoint> {
    wrappers
        .into_iter()
        .filter_map(|w| w.datapoint)
        .filter_map(|d| {
            d.updated_at
                .as_deref()
                .and_then(parse_timestamp)
                .map(|ts| (ts, d))
        })
        .max_by_key(|(ts, _)| *ts)
        .map(|(_, d)| d)
}
