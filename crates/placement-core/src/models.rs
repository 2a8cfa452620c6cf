//! Session, company listing and controller state
//!
//! `ControllerState` is the single value the presentation layer reads. It is
//! published whole on every change, so views never see a half-applied update.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::constants::ui::GREETING_NAME_MAX;

/// An authenticated student
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub display_name: String,
    pub roll_number: String,
    /// Opaque credential for authenticated calls; never serialized
    #[serde(skip)]
    token: String,
}

impl Session {
    pub fn new(
        display_name: impl Into<String>,
        roll_number: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            roll_number: roll_number.into(),
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Display name cut to 20 characters, with `...` when it was longer
    pub fn greeting_name(&self) -> String {
        if self.display_name.chars().count() > GREETING_NAME_MAX {
            let short: String = self.display_name.chars().take(GREETING_NAME_MAX).collect();
            format!("{}...", short)
        } else {
            self.display_name.clone()
        }
    }
}

/// One company entry as returned by `/getallcompanylist`.
///
/// The listing is rendered as sent: null text becomes empty and numeric or
/// boolean values are kept as their text, so one odd record never rejects
/// the whole list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub company_name: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub profile_name: String,
    #[serde(default, deserialize_with = "optional_text")]
    pub resume_deadline: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub ppt_date: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub ppt_time: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub test_date: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub test_time: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub gd_date: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub gd_time: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub interview_date: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub interview_time: Option<String>,
}

/// Text of a scalar JSON value; null, arrays and objects have none
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(scalar_text)
}

fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    optional_text(deserializer).map(Option::unwrap_or_default)
}

impl CompanyRecord {
    pub fn resume_deadline(&self) -> &str {
        self.resume_deadline
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or("-")
    }

    /// Pre-placement talk
    pub fn ppt(&self) -> Milestone<'_> {
        Milestone::new(&self.ppt_date, &self.ppt_time)
    }

    pub fn test(&self) -> Milestone<'_> {
        Milestone::new(&self.test_date, &self.test_time)
    }

    pub fn group_discussion(&self) -> Milestone<'_> {
        Milestone::new(&self.gd_date, &self.gd_time)
    }

    pub fn interview(&self) -> Milestone<'_> {
        Milestone::new(&self.interview_date, &self.interview_time)
    }
}

/// A (date, time) pair from a company record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone<'a> {
    pub date: Option<&'a str>,
    pub time: Option<&'a str>,
}

impl<'a> Milestone<'a> {
    fn new(date: &'a Option<String>, time: &'a Option<String>) -> Self {
        Self {
            date: date.as_deref().filter(|d| !d.is_empty()),
            time: time.as_deref().filter(|t| !t.is_empty()),
        }
    }

    /// `"date, time"` when both halves are known, otherwise `"-"`
    pub fn display(&self) -> String {
        match (self.date, self.time) {
            (Some(date), Some(time)) => format!("{}, {}", date, time),
            _ => "-".to_string(),
        }
    }
}

/// Rate-limit backoff countdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackoffState {
    pub active: bool,
    pub remaining_ms: u64,
}

impl BackoffState {
    pub fn counting(remaining_ms: u64) -> Self {
        Self {
            active: true,
            remaining_ms,
        }
    }

    /// Status line shown while backing off, `None` otherwise
    pub fn status_message(&self) -> Option<String> {
        self.active.then(|| {
            format!(
                "Status 429, retrying in {}s...",
                self.remaining_ms / 1000
            )
        })
    }
}

/// Where the controller is in the login/fetch lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    LoggedOut,
    Authenticating,
    Idle,
    FetchingCompanies,
    Backoff,
}

/// Everything the presentation layer renders
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerState {
    pub phase: Phase,
    pub session: Option<Session>,
    pub loading: bool,
    pub companies: Vec<CompanyRecord>,
    pub backoff: BackoffState,
    /// Last user-visible alert, cleared by the next login or on dismiss
    pub alert: Option<String>,
    /// Bumped on every login and logout; writes from an older epoch are dropped
    #[serde(skip)]
    pub(crate) epoch: u64,
    /// Cancels the in-flight fetch and countdown of the current session
    #[serde(skip)]
    pub(crate) cancel: CancellationToken,
}

impl ControllerState {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn status_message(&self) -> Option<String> {
        self.backoff.status_message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_truncates_long_names() {
        let session = Session::new("Aravind Ramachandran Subramanian", "EE19B001", "t");
        assert_eq!(session.greeting_name(), "Aravind Ramachandran...");

        let short = Session::new("Asha", "EE19B001", "t");
        assert_eq!(short.greeting_name(), "Asha");
    }

    #[test]
    fn milestone_needs_both_halves() {
        let record = CompanyRecord {
            ppt_date: Some("12 Aug".to_string()),
            ppt_time: Some("10:00".to_string()),
            test_date: Some("13 Aug".to_string()),
            gd_time: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(record.ppt().display(), "12 Aug, 10:00");
        assert_eq!(record.test().display(), "-");
        assert_eq!(record.group_discussion().display(), "-");
        assert_eq!(record.interview().display(), "-");
        assert_eq!(record.resume_deadline(), "-");
    }

    #[test]
    fn status_message_floors_seconds() {
        assert_eq!(
            BackoffState::counting(9_500).status_message().as_deref(),
            Some("Status 429, retrying in 9s...")
        );
        assert!(BackoffState::default().status_message().is_none());
    }

    #[test]
    fn token_stays_out_of_serialized_state() {
        let state = ControllerState {
            phase: Phase::Idle,
            session: Some(Session::new("Asha", "EE19B001", "secret-token")),
            ..Default::default()
        };
        let json = serde_json::to_string(&state).unwrap();

        assert!(json.contains("\"rollNumber\":\"EE19B001\""));
        assert!(json.contains("\"phase\":\"idle\""));
        assert!(!json.contains("secret-token"));
        assert!(!json.contains("epoch"));
    }

    #[test]
    fn company_record_reads_camel_case_with_gaps() {
        let record: CompanyRecord = serde_json::from_str(
            r#"{"companyName":"Acme","profileName":"Analyst","pptDate":null,"interviewDate":"1 Dec","interviewTime":"9:00"}"#,
        )
        .unwrap();

        assert_eq!(record.company_name, "Acme");
        assert_eq!(record.profile_name, "Analyst");
        assert!(record.ppt_date.is_none());
        assert_eq!(record.interview().display(), "1 Dec, 9:00");
    }
}
