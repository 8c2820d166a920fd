//! Anonymous browser sessions
//!
//! A session is a random 128-bit id kept in a cookie. It is the only scoping
//! key for stored data; there are no accounts.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "tododesk_session";

const SESSION_ID_LEN: usize = 32;

/// A validated session id: 32 lowercase hex characters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Draw a fresh id from 16 random bytes
    pub fn generate() -> Self {
        let bytes: [u8; 16] = rand::rng().random();
        Self(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Accept a cookie value only if it has the shape `generate` produces
    pub fn parse(value: &str) -> Option<Self> {
        let well_formed = value.len() == SESSION_ID_LEN
            && value.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        well_formed.then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Find our cookie among the request's `Cookie` headers
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .and_then(|(_, value)| Self::parse(value.trim()))
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attributes of the issued cookie
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub secure: bool,
    pub max_age_secs: u64,
}

impl CookieSettings {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            secure: config.cookie_secure,
            max_age_secs: u64::from(config.session_days) * 24 * 60 * 60,
        }
    }

    /// `Set-Cookie` value for a session
    pub fn set_cookie(&self, session: &SessionId) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, session, self.max_age_secs
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Middleware: attach a `SessionId` to every request, issuing one if needed
pub async fn session_layer(
    State(settings): State<Arc<CookieSettings>>,
    mut request: Request,
    next: Next,
) -> Response {
    let (session, issued) = match SessionId::from_headers(request.headers()) {
        Some(session) => (session, false),
        None => {
            let session = SessionId::generate();
            info!(%session, "New session created");
            (session, true)
        }
    };
    debug!(%session, "session_layer: request");

    request.extensions_mut().insert(session.clone());
    let mut response = next.run(request).await;

    if issued {
        match HeaderValue::from_str(&settings.set_cookie(&session)) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => warn!(error = %e, "session_layer: invalid Set-Cookie value"),
        }
    }

    response
}
