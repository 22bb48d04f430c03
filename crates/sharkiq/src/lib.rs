//! Unofficial client for the Ayla Networks IoT API as used by Shark IQ
//! robot vacuums.
//!
//! - [`AylaClient`] — session lifecycle (sign-in / refresh / sign-out), the
//!   authenticated request wrapper with token auto-refresh, and the device
//!   directory.
//! - [`SharkVacuum`] — per-device handle: property reads/writes, operating
//!   and power modes, the locate chirp, device metadata, file-backed
//!   properties (stored maps), and room-scoped cleaning.
//! - [`Property`] / [`PropertyValue`] — the closed registry of known device
//!   properties and the tagged value type they decode into.
//! - [`blocking`] — synchronous facade with identical semantics, for hosts
//!   without an async runtime.
//!
//! Each client instance assumes a single caller: concurrent callers sharing
//! one client must serialize token refreshes themselves, or two refreshes
//! may race.
//!
//! ```no_run
//! use std::sync::Arc;
//! use sharkiq::{AylaClient, Credentials, OperatingMode, Region};
//!
//! # async fn demo() -> Result<(), sharkiq::Error> {
//! let client = Arc::new(AylaClient::new(
//!     Credentials::for_region(Region::Field, "you@example.com", "hunter2"),
//!     Region::Field,
//! )?);
//! client.sign_in().await?;
//!
//! let mut vacuums = client.get_devices().await?;
//! if let Some(vacuum) = vacuums.first_mut() {
//!     vacuum.update(None).await?;
//!     vacuum.set_operating_mode(OperatingMode::Start).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod blocking;
pub mod error;
pub mod models;
pub mod properties;
pub mod rooms;

mod auth;
mod client;
mod region;
mod transport;
mod vacuum;

pub use auth::Credentials;
pub use client::AylaClient;
pub use error::Error;
pub use models::DeviceRecord;
pub use properties::{
    OperatingMode, PowerMode, Property, PropertyKind, PropertyValue, error_message,
};
pub use region::Region;
pub use rooms::RoomList;
pub use transport::TransportConfig;
pub use vacuum::{PropertyState, SharkVacuum};
