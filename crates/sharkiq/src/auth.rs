// Account credentials and session token state.
//
// The token triple (access token, refresh token, expiry) lives behind the
// client only; device handles never see or copy it.

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use crate::region::Region;

/// Account credentials plus the vendor application identity.
///
/// Immutable after construction. The password and application secret are
/// held as [`SecretString`] and only exposed when serializing the sign-in
/// request body.
#[derive(Debug, Clone)]
pub struct Credentials {
    email: String,
    password: SecretString,
    app_id: String,
    app_secret: SecretString,
}

impl Credentials {
    /// Credentials with an explicit application identity.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
            app_id: app_id.into(),
            app_secret: SecretString::from(app_secret.into()),
        }
    }

    /// Credentials using the fixed Shark application identity for `region`.
    pub fn for_region(region: Region, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self::new(email, password, region.app_id(), region.app_secret())
    }

    /// The account email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Request body for `POST /users/sign_in.json`.
    pub(crate) fn login_body(&self) -> serde_json::Value {
        json!({
            "user": {
                "email": self.email,
                "password": self.password.expose_secret(),
                "application": {
                    "app_id": self.app_id,
                    "app_secret": self.app_secret.expose_secret(),
                },
            }
        })
    }
}

/// The live session: token pair and computed expiry instant.
///
/// At most one of these exists per client, replaced wholesale on sign-in
/// and refresh, dropped on sign-out.
#[derive(Debug, Clone)]
pub(crate) struct AuthState {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthState {
    /// True once the declared lifetime has fully elapsed.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// True if the current time is within `margin` of expiry.
    pub fn expiring_within(&self, margin: TimeDelta) -> bool {
        Utc::now() >= self.expires_at - margin
    }
}
