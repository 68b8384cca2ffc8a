//! Browser session identity carried in a cookie.

use axum::http::{header, HeaderMap, HeaderValue};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "irab_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }

    /// `Set-Cookie` value for this id. No Max-Age: the cookie lives as long
    /// as the browser session.
    pub fn cookie(&self) -> String {
        format!("{}={}; HttpOnly; SameSite=Lax; Path=/", SESSION_COOKIE, self.0)
    }

    pub fn set_cookie_header(&self) -> (header::HeaderName, HeaderValue) {
        let value = HeaderValue::from_str(&self.cookie())
            .unwrap_or_else(|_| HeaderValue::from_static(""));
        (header::SET_COOKIE, value)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Session id from the request's `Cookie` headers, if present and well formed.
pub fn session_id(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| SessionId::parse(value))
}
