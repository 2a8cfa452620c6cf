//! Wire types for the placement API

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::api::{LIST_INVALID, LOGIN_SUCCESS};
use crate::error::ApiError;
use crate::models::{CompanyRecord, Session};

/// Body of `POST /checkstudentlogin`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub roll_number: &'a str,
    pub student_password: &'a str,
}

/// Login reply. Every field is optional because failures come back with
/// arbitrary shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rollno: Option<String>,
}

impl LoginResponse {
    /// Convenience constructor for a successful reply
    pub fn success(token: &str, name: &str, rollno: &str) -> Self {
        Self {
            status: Some(LOGIN_SUCCESS.to_string()),
            token: Some(token.to_string()),
            name: Some(name.to_string()),
            rollno: Some(rollno.to_string()),
        }
    }

    /// Build a session when the reply carries the success marker and a
    /// non-empty token. The session keeps the roll number that was submitted.
    pub fn into_session(self, roll_number: &str) -> Option<Session> {
        if self.status.as_deref() != Some(LOGIN_SUCCESS) {
            return None;
        }
        let token = self.token.filter(|t| !t.is_empty())?;
        Some(Session::new(
            self.name.unwrap_or_default(),
            roll_number,
            token,
        ))
    }
}

/// Decoded `GET /getallcompanylist` reply with HTTP 200
#[derive(Debug, Clone, PartialEq)]
pub enum CompanyListResponse {
    /// The listing, in server order
    Companies(Vec<CompanyRecord>),
    /// `{ "status": "invalid" }`
    Invalid,
    /// Anything else; kept for logging
    Unrecognized(Value),
}

impl CompanyListResponse {
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Array(_) => serde_json::from_value(value)
                .map(Self::Companies)
                .map_err(|e| ApiError::Decode(e.to_string())),
            Value::Object(ref map)
                if map.get("status").and_then(Value::as_str) == Some(LIST_INVALID) =>
            {
                Ok(Self::Invalid)
            }
            other => Ok(Self::Unrecognized(other)),
        }
    }
}
