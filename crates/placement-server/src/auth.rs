//! Browser session cookie.
//!
//! The placement token never leaves the server: the browser only holds an
//! opaque id that maps to a `StudentController` in `AppState::sessions`.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

pub const SESSION_COOKIE: &str = "placement_sid";

/// Extractor for the browser session id, if the request carries one.
#[derive(Debug, Clone)]
pub struct BrowserSession(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for BrowserSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(session_id_from_cookie_header);
        Ok(BrowserSession(id))
    }
}

fn session_id_from_cookie_header(header: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value binding the browser to a session id
pub fn session_cookie(session_id: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, session_id
    )
}

/// `Set-Cookie` value that drops the session cookie
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
