//! Student login form validation
//!
//! Runs before any network call: both fields are required and the roll
//! number must be exactly eight characters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::validation::{INVALID_ROLL_NUMBER, REQUIRED, ROLL_NUMBER_LEN};

/// Raw form input as typed by the student
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    #[serde(default)]
    pub roll_number: String,
    #[serde(default)]
    pub student_password: String,
}

/// Validated credentials, ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Uppercased roll number
    pub roll_number: String,
    pub password: String,
}

/// Per-field validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_password: Option<&'static str>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.roll_number.is_none() && self.student_password.is_none()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("Roll Number", self.roll_number),
            ("Password", self.student_password),
        ];
        let mut first = true;
        for (label, message) in fields {
            if let Some(message) = message {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", label, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl LoginForm {
    pub fn new(roll_number: impl Into<String>, student_password: impl Into<String>) -> Self {
        Self {
            roll_number: roll_number.into(),
            student_password: student_password.into(),
        }
    }

    /// Check the form and normalize the roll number to uppercase
    pub fn validate(&self) -> Result<Credentials, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.roll_number.is_empty() {
            errors.roll_number = Some(REQUIRED);
        } else if self.roll_number.chars().count() != ROLL_NUMBER_LEN {
            errors.roll_number = Some(INVALID_ROLL_NUMBER);
        }

        if self.student_password.is_empty() {
            errors.student_password = Some(REQUIRED);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Credentials {
            roll_number: self.roll_number.to_uppercase(),
            password: self.student_password.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_form_uppercases_roll_number() {
        let credentials = LoginForm::new("ee19b001", "pw").validate().unwrap();
        assert_eq!(credentials.roll_number, "EE19B001");
        assert_eq!(credentials.password, "pw");
    }

    #[test]
    fn roll_number_must_be_eight_characters() {
        for roll in ["1234567", "123456789", "ab"] {
            let errors = LoginForm::new(roll, "pw").validate().unwrap_err();
            assert_eq!(errors.roll_number, Some(INVALID_ROLL_NUMBER));
            assert!(errors.student_password.is_none());
        }
    }

    #[test]
    fn empty_fields_are_required() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert_eq!(errors.roll_number, Some(REQUIRED));
        assert_eq!(errors.student_password, Some(REQUIRED));
        assert_eq!(
            errors.to_string(),
            "Roll Number: Required!; Password: Required!"
        );
    }

    #[test]
    fn form_field_names_match_the_page() {
        let form: LoginForm =
            serde_json::from_str(r#"{"rollNumber":"ME20B123","studentPassword":"x"}"#).unwrap();
        assert_eq!(form, LoginForm::new("ME20B123", "x"));
    }
}
