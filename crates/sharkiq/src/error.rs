use thiserror::Error;

/// Top-level error type for the `sharkiq` crate.
///
/// Covers every failure mode across the client: authentication, transport,
/// vendor API errors, and the property/room convenience layers. Nothing is
/// retried or recovered internally; each failure surfaces as a distinct
/// variant carrying enough context to diagnose without reading crate
/// internals.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Sign-in or token refresh was rejected (wrong credentials, expired
    /// refresh token, bad application identity).
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// An operation required a session but none is active (never signed in,
    /// signed out, or the token lapsed with auto-refresh disabled).
    #[error("Not authenticated -- sign in and retry")]
    NotAuthenticated,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Vendor API ──────────────────────────────────────────────────
    /// Non-2xx response from the Ayla API, with the vendor message when the
    /// body carried one.
    #[error("Ayla API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Properties ──────────────────────────────────────────────────
    /// A file-oriented operation was attempted on a property that is not
    /// file-typed.
    #[error("Property '{property}' is not file-typed")]
    PropertyType { property: String },

    /// Attempted to write a property the device reports as read-only.
    #[error("Property '{property}' is read-only")]
    ReadOnlyProperty { property: String },

    // ── Rooms ───────────────────────────────────────────────────────
    /// A room-scoped clean referenced a name missing from the device's
    /// current room list.
    #[error("Unknown room: '{room}'")]
    UnknownRoom { room: String },

    // ── Blocking facade ─────────────────────────────────────────────
    /// Failed to start the runtime backing the blocking call surface.
    #[error("Failed to start blocking runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` if this error indicates the session is gone and a new
    /// sign-in might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Auth { .. } | Self::NotAuthenticated)
    }

    /// Returns `true` for a vendor "not found" response.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }
}
