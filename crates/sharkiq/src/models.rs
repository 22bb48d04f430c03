// Wire-format models for the Ayla REST API.
//
// Fields use `#[serde(default)]` liberally because the API is inconsistent
// about field presence across device firmware; catch-all `extra` maps keep
// undocumented fields reachable.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp format the Ayla API uses for datapoints.
const TIMESTAMP_FMT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parse an Ayla timestamp (`2024-06-15T10:30:00Z`).
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FMT)
        .ok()
        .map(|naive| naive.and_utc())
}

// ── Identity endpoint ────────────────────────────────────────────────

/// Token triple from `POST /users/sign_in.json` and `/users/refresh_token.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Vendor error body: `{"error": {"message": "..."}}`, occasionally a bare
/// string under `"error"`.
#[derive(Debug, Deserialize)]
struct VendorError {
    #[serde(default)]
    error: Option<VendorErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VendorErrorDetail {
    Structured { message: String },
    Plain(String),
}

/// Extract the vendor error message from a response body, if it has one.
pub(crate) fn vendor_message(body: &str) -> Option<String> {
    let parsed: VendorError = serde_json::from_str(body).ok()?;
    match parsed.error? {
        VendorErrorDetail::Structured { message } | VendorErrorDetail::Plain(message) => {
            Some(message)
        }
    }
}

// ── Device directory ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct DeviceWrapper {
    pub device: DeviceRecord,
}

/// One registered device from `GET /apiv1/devices.json`.
///
/// Immutable snapshot; refreshed by re-listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Device serial number; the primary identifier in every device-scoped URL.
    pub dsn: String,
    /// Numeric device key used by property-scoped endpoints.
    pub key: i64,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub oem_model: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub sw_version: Option<String>,
    #[serde(default)]
    pub connection_status: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub lan_ip: Option<String>,
    #[serde(default)]
    pub connected_at: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Properties ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct PropertyWrapper {
    pub property: PropertyRecord,
}

/// Raw property record from `GET /apiv1/dsns/{dsn}/properties.json`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PropertyRecord {
    pub name: String,
    #[serde(default)]
    pub base_type: Option<String>,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub key: Option<i64>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub data_updated_at: Option<String>,
}

// ── Datapoints ───────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DatapointWrapper {
    #[serde(default)]
    pub datapoint: Option<Datapoint>,
}

/// One datapoint, as returned by datapoint listings and write responses.
/// Only the fields the client consumes are modeled; the raw value is not
/// one of them (reads go through the property listing instead).
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Datapoint {
    /// Download URL; present only on file-typed properties.
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

// ── Device metadata ──────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DatumWrapper {
    #[serde(default)]
    pub datum: Option<Datum>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Datum {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// Payload of the `sharkDeviceMobileData` datum. The vendor packs these into
/// a single JSON-encoded string value rather than separate datum keys.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct MobileData {
    #[serde(default, rename = "vacModelNumber")]
    pub vac_model_number: Option<String>,
    #[serde(default, rename = "vacSerialNumber")]
    pub vac_serial_number: Option<String>,
}
