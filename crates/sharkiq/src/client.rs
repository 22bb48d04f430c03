// Ayla cloud client: session lifecycle, the authenticated request wrapper,
// and the device directory.
//
// Token state is the only mutable field. It lives behind a lock that is
// never held across an await, and the client assumes single-caller use per
// instance: concurrent callers sharing one client must serialize refreshes
// themselves, or two refreshes may race and the loser's token wins.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::auth::{AuthState, Credentials};
use crate::error::Error;
use crate::models::{AuthResponse, DeviceRecord, DeviceWrapper, vendor_message};
use crate::region::Region;
use crate::transport::TransportConfig;
use crate::vacuum::SharkVacuum;

/// Refresh the token when it is this close to expiry.
const REFRESH_MARGIN_SECS: i64 = 600;

/// Client for the Ayla Networks API as deployed for Shark IQ vacuums.
///
/// Owns the session token exclusively; [`SharkVacuum`] handles hold only a
/// shared reference to the client and route every request through it.
pub struct AylaClient {
    http: reqwest::Client,
    credentials: Credentials,
    login_url: Url,
    device_url: Url,
    auth: RwLock<Option<AuthState>>,
}

impl AylaClient {
    // ── Constructors ─────────────────────────────────────────────────

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
        let http = transport.build_client()?;
        Ok(Self {
            http,
            credentials,
            login_url: Url::parse(region.login_url())?,
            device_url: Url::parse(region.device_url())?,
            auth: RwLock::new(None),
        })
    }

    /// Client with a pre-built `reqwest::Client` and explicit endpoints.
    ///
    /// Use this to point the client at something other than the production
    /// deployments, e.g. a local mock during testing.
    pub fn with_endpoints(
        http: reqwest::Client,
        credentials: Credentials,
        login_url: Url,
        device_url: Url,
    ) -> Self {
        Self {
            http,
            credentials,
            login_url,
            device_url,
            auth: RwLock::new(None),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The underlying HTTP client (for unauthenticated fetches).
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The account credentials this client signs in with.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Whether a session token is currently held.
    pub fn is_authenticated(&self) -> bool {
        self.auth_read().is_some()
    }

    /// When the current token expires, if a session is active.
    pub fn auth_expiration(&self) -> Option<DateTime<Utc>> {
        self.auth_read().as_ref().map(|state| state.expires_at)
    }

    /// True if no session is active or the token expires within `margin`.
    pub fn token_expiring_within(&self, margin: std::time::Duration) -> bool {
        let Ok(margin) = TimeDelta::from_std(margin) else {
            return true;
        };
        self.auth_read()
            .as_ref()
            .is_none_or(|state| state.expiring_within(margin))
    }

    fn auth_read(&self) -> RwLockReadGuard<'_, Option<AuthState>> {
        self.auth.read().expect("auth lock poisoned")
    }

    fn auth_write(&self) -> RwLockWriteGuard<'_, Option<AuthState>> {
        self.auth.write().expect("auth lock poisoned")
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn login_endpoint(&self, path: &str) -> Result<Url, Error> {
        self.login_url.join(path).map_err(Error::InvalidUrl)
    }

    /// Build a full URL on the device service.
    pub(crate) fn device_endpoint(&self, path: &str) -> Result<Url, Error> {
        self.device_url.join(path).map_err(Error::InvalidUrl)
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Authenticate against the identity endpoint and store the token triple.
    ///
    /// `POST /users/sign_in.json`
    pub async fn sign_in(&self) -> Result<(), Error> {
        let url = self.login_endpoint("/users/sign_in.json")?;
        debug!("signing in at {url}");

        let resp = self
            .http
            .post(url)
            .json(&self.credentials.login_body())
            .send()
            .await
            .map_err(Error::Transport)?;

        let state = Self::parse_auth_response(resp).await?;
        *self.auth_write() = Some(state);
        debug!("sign-in successful");
        Ok(())
    }

    /// Exchange the stored refresh token for a fresh token triple.
    ///
    /// `POST /users/refresh_token.json`. Fails with
    /// [`Error::NotAuthenticated`] when no sign-in has happened, and with
    /// [`Error::Auth`] when the refresh token itself is rejected -- the
    /// session is fully expired and the caller must sign in again.
    pub async fn refresh(&self) -> Result<(), Error> {
        let refresh_token = self
            .auth_read()
            .as_ref()
            .ok_or(Error::NotAuthenticated)?
            .refresh_token
            .clone();

        let url = self.login_endpoint("/users/refresh_token.json")?;
        debug!("refreshing access token");

        let body = json!({ "user": { "refresh_token": refresh_token } });
        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let state = Self::parse_auth_response(resp).await?;
        *self.auth_write() = Some(state);
        Ok(())
    }

    /// Invalidate the server-side session and clear the local token state.
    ///
    /// `POST /users/sign_out.json`. The response status is not interpreted:
    /// local state is cleared as long as the request itself went out.
    pub async fn sign_out(&self) -> Result<(), Error> {
        let access_token = self
            .auth_read()
            .as_ref()
            .ok_or(Error::NotAuthenticated)?
            .access_token
            .clone();

        let url = self.login_endpoint("/users/sign_out.json")?;
        debug!("signing out");

        let body = json!({ "user": { "access_token": access_token } });
        self.http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        *self.auth_write() = None;
        Ok(())
    }

    /// Map an identity-endpoint response into a fresh [`AuthState`].
    ///
    /// A 404 here means the application identity was not recognized, which
    /// reads like a missing route; point the caller at the likely cause.
    async fn parse_auth_response(resp: Response) -> Result<AuthState, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if status == StatusCode::NOT_FOUND {
            let message = vendor_message(&body).unwrap_or_else(|| body.clone());
            return Err(Error::Auth {
                message: format!("{message} (confirm app_id and app_secret are correct)"),
            });
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Auth {
                message: vendor_message(&body).unwrap_or_else(|| "invalid credentials".to_owned()),
            });
        }
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: vendor_message(&body).unwrap_or(body),
            });
        }

        let auth: AuthResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            })?;

        Ok(AuthState {
            access_token: auth.access_token,
            refresh_token: auth.refresh_token,
            expires_at: Utc::now() + TimeDelta::seconds(auth.expires_in),
        })
    }

    // ── Request wrapper ──────────────────────────────────────────────

    /// Issue an authenticated request.
    ///
    /// Attaches `Authorization: Bearer <token>`. With `auto_refresh` the
    /// token is refreshed first whenever it is within the refresh margin of
    /// expiry, so a request is never sent with a token past its declared
    /// lifetime. Transport failures propagate unmodified; nothing is
    /// retried.
    pub async fn request(
        &self,
        method: Method,
        url: Url,
        auto_refresh: bool,
    ) -> Result<Response, Error> {
        let req = self.request_builder(method, url, auto_refresh).await?;
        req.send().await.map_err(Error::Transport)
    }

    /// Build an authenticated `RequestBuilder`, refreshing first if needed.
    ///
    /// Use this instead of [`request`](Self::request) to attach extra
    /// headers, query parameters, or a body before sending.
    pub async fn request_builder(
        &self,
        method: Method,
        url: Url,
        auto_refresh: bool,
    ) -> Result<reqwest::RequestBuilder, Error> {
        if auto_refresh && self.token_needs_refresh() {
            self.refresh().await?;
        }

        let token = {
            let guard = self.auth_read();
            let state = guard.as_ref().ok_or(Error::NotAuthenticated)?;
            if state.is_expired() {
                return Err(Error::NotAuthenticated);
            }
            state.access_token.clone()
        };

        Ok(self.http.request(method, url).bearer_auth(token))
    }

    fn token_needs_refresh(&self) -> bool {
        self.auth_read()
            .as_ref()
            .is_some_and(|state| state.expiring_within(TimeDelta::seconds(REFRESH_MARGIN_SECS)))
    }

    /// Authenticated GET, parsed as JSON.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        debug!("GET {url}");
        let mut req = self.request_builder(Method::GET, url, true).await?;
        if !query.is_empty() {
            req = req.query(query);
        }
        let resp = req.send().await.map_err(Error::Transport)?;
        Self::parse_json(resp).await
    }

    /// Authenticated POST where a success body is optional; an empty or
    /// unparseable 2xx body yields `None` instead of an error.
    pub(crate) async fn post_json_opt<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<Option<T>, Error> {
        debug!("POST {url}");
        let resp = self
            .request_builder(Method::POST, url, true)
            .await?
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;
        Self::check_status(status, &body)?;
        Ok(serde_json::from_str(&body).ok())
    }

    async fn parse_json<T: DeserializeOwned>(resp: Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;
        Self::check_status(status, &body)?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    fn check_status(status: StatusCode, body: &str) -> Result<(), Error> {
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Auth {
                message: vendor_message(body)
                    .unwrap_or_else(|| "session expired or invalid credentials".to_owned()),
            });
        }
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: vendor_message(body).unwrap_or_else(|| body.to_owned()),
            });
        }
        Ok(())
    }

    // ── Device directory ─────────────────────────────────────────────

    /// List the devices registered to the account.
    ///
    /// `GET /apiv1/devices.json`. An account with no registered devices
    /// yields an empty list, not an error.
    pub async fn list_devices(&self) -> Result<Vec<DeviceRecord>, Error> {
        let url = self.device_endpoint("/apiv1/devices.json")?;
        debug!("listing devices");
        let wrappers: Vec<DeviceWrapper> = self.get_json(url, &[]).await?;
        Ok(wrappers.into_iter().map(|w| w.device).collect())
    }

    /// Wrap every registered device in a [`SharkVacuum`] handle bound to
    /// this client, preserving listing order.
    pub async fn get_devices(self: &Arc<Self>) -> Result<Vec<SharkVacuum>, Error> {
        let records = self.list_devices().await?;
        Ok(records
            .into_iter()
            .map(|record| SharkVacuum::new(Arc::clone(self), record))
            .collect())
    }
}
