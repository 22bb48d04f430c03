// Blocking facade over the async client.
//
// Owns a current-thread tokio runtime and drives the async core to
// completion on the calling thread; every method has identical semantics to
// its async counterpart. Do not call from inside an async context -- use
// the async types directly there.

use std::sync::Arc;

use bytes::Bytes;
use tokio::runtime::{Builder, Runtime};
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::models::DeviceRecord;
use crate::properties::{OperatingMode, PowerMode, PropertyValue};
use crate::region::Region;
use crate::rooms::RoomList;
use crate::transport::TransportConfig;
use crate::vacuum::PropertyState;

fn runtime() -> Result<Arc<Runtime>, Error> {
    Ok(Arc::new(
        Builder::new_current_thread().enable_all().build()?,
    ))
}

/// Blocking counterpart of [`crate::AylaClient`].
pub struct AylaClient {
    inner: Arc<crate::AylaClient>,
    runtime: Arc<Runtime>,
}

impl AylaClient {
    /// Client for `region` with the default transport settings.
    pub fn new(credentials: Credentials, region: Region) -> Result<Self, Error> {
        Self::with_transport(credentials, region, &TransportConfig::default())
    }

    /// Client for `region` with explicit transport settings.
    pub fn with_transport(
        credentials: Credentials,
        region: Region,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            inner: Arc::new(crate::AylaClient::with_transport(
                credentials,
                region,
                transport,
            )?),
            runtime: runtime()?,
        })
    }

    /// Client pointed at explicit endpoints (e.g. a local mock).
    pub fn with_endpoints(
        credentials: Credentials,
        login_url: Url,
        device_url: Url,
    ) -> Result<Self, Error> {
        let http = TransportConfig::default().build_client()?;
        Ok(Self {
            inner: Arc::new(crate::AylaClient::with_endpoints(
                http, credentials, login_url, device_url,
            )),
            runtime: runtime()?,
        })
    }

    /// The async client this facade drives.
    pub fn async_client(&self) -> &Arc<crate::AylaClient> {
        &self.inner
    }

    pub fn sign_in(&self) -> Result<(), Error> {
        self.runtime.block_on(self.inner.sign_in())
    }

    pub fn refresh(&self) -> Result<(), Error> {
        self.runtime.block_on(self.inner.refresh())
    }

    pub fn sign_out(&self) -> Result<(), Error> {
        self.runtime.block_on(self.inner.sign_out())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.is_authenticated()
    }

    pub fn token_expiring_within(&self, margin: std::time::Duration) -> bool {
        self.inner.token_expiring_within(margin)
    }

    pub fn list_devices(&self) -> Result<Vec<DeviceRecord>, Error> {
        self.runtime.block_on(self.inner.list_devices())
    }

    pub fn get_devices(&self) -> Result<Vec<SharkVacuum>, Error> {
        let vacuums = self.runtime.block_on(self.inner.get_devices())?;
        Ok(vacuums
            .into_iter()
            .map(|inner| SharkVacuum {
                inner,
                runtime: Arc::clone(&self.runtime),
            })
            .collect())
    }
}

/// Blocking counterpart of [`crate::SharkVacuum`].
pub struct SharkVacuum {
    inner: crate::SharkVacuum,
    runtime: Arc<Runtime>,
}

impl SharkVacuum {
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn serial_number(&self) -> &str {
        self.inner.serial_number()
    }

    pub fn oem_model_number(&self) -> &str {
        self.inner.oem_model_number()
    }

    pub fn vac_model_number(&self) -> Option<&str> {
        self.inner.vac_model_number()
    }

    pub fn vac_serial_number(&self) -> Option<&str> {
        self.inner.vac_serial_number()
    }

    pub fn update(&mut self, names: Option<&[&str]>) -> Result<(), Error> {
        let runtime = Arc::clone(&self.runtime);
        runtime.block_on(self.inner.update(names))
    }

    pub fn get_property_value(&self, name: impl AsRef<str>) -> Option<PropertyValue> {
        self.inner.get_property_value(name)
    }

    pub fn property_state(&self, name: impl AsRef<str>) -> Option<&PropertyState> {
        self.inner.property_state(name)
    }

    pub fn set_property_value(
        &mut self,
        name: impl AsRef<str>,
        value: impl Into<PropertyValue>,
    ) -> Result<(), Error> {
        let runtime = Arc::clone(&self.runtime);
        runtime.block_on(self.inner.set_property_value(name, value))
    }

    pub fn set_operating_mode(&mut self, mode: OperatingMode) -> Result<(), Error> {
        let runtime = Arc::clone(&self.runtime);
        runtime.block_on(self.inner.set_operating_mode(mode))
    }

    pub fn set_power_mode(&mut self, mode: PowerMode) -> Result<(), Error> {
        let runtime = Arc::clone(&self.runtime);
        runtime.block_on(self.inner.set_power_mode(mode))
    }

    pub fn find_device(&mut self) -> Result<(), Error> {
        let runtime = Arc::clone(&self.runtime);
        runtime.block_on(self.inner.find_device())
    }

    pub fn error_code(&self) -> Option<i64> {
        self.inner.error_code()
    }

    pub fn error_text(&self) -> Option<String> {
        self.inner.error_text()
    }

    pub fn get_metadata(&mut self) -> Result<(), Error> {
        let runtime = Arc::clone(&self.runtime);
        runtime.block_on(self.inner.get_metadata())
    }

    pub fn get_file_property_url(&self, name: impl AsRef<str>) -> Result<Option<String>, Error> {
        self.runtime.block_on(self.inner.get_file_property_url(name))
    }

    pub fn get_file_property(&self, name: impl AsRef<str>) -> Result<Option<Bytes>, Error> {
        self.runtime.block_on(self.inner.get_file_property(name))
    }

    pub fn get_room_list(&self) -> Option<RoomList> {
        self.inner.get_room_list()
    }

    pub fn clean_rooms(&mut self, rooms: &[&str]) -> Result<(), Error> {
        let runtime = Arc::clone(&self.runtime);
        runtime.block_on(self.inner.clean_rooms(rooms))
    }
}
