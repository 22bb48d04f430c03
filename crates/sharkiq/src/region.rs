// Regional Ayla deployments and the vendor application identity.
//
// Shark runs separate Ayla field deployments for North America and Europe,
// each with its own identity/device hosts and a fixed app_id/app_secret
// pair shipped inside the mobile app.

/// Which Ayla deployment the account is registered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Region {
    /// North America field deployment.
    #[default]
    Field,
    /// European field deployment.
    Europe,
}

impl Region {
    /// Base URL of the identity (sign-in / refresh / sign-out) service.
    pub fn login_url(self) -> &'static str {
        match self {
            Self::Field => "https://user-field-39a9391a.aylanetworks.com",
            Self::Europe => "https://user-field-eu.aylanetworks.com",
        }
    }

    /// Base URL of the device service (directory, properties, datapoints).
    pub fn device_url(self) -> &'static str {
        match self {
            Self::Field => "https://ads-field-39a9391a.aylanetworks.com",
            Self::Europe => "https://ads-eu.aylanetworks.com",
        }
    }

    /// Application identifier registered with this deployment.
    pub fn app_id(self) -> &'static str {
        match self {
            Self::Field => "Shark-Android-field-id",
            Self::Europe => "Shark-Android-EUField-Fw-id",
        }
    }

    /// Application secret paired with [`app_id`](Self::app_id).
    pub fn app_secret(self) -> &'static str {
        match self {
            Self::Field => "Shark-Android-field-Wv43MbdXRM297HUHotqe6lU1n-w",
            Self::Europe => "Shark-Android-EUField-s-zTykblGJujGcSSTaJaeE4PESI",
        }
    }
}
