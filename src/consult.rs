//! Consultation request form checks.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static MOBILE_PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^09\d{8}$").unwrap());
static PHONE_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]").unwrap());
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsultationError {
    #[error("Please fill in the required fields")]
    MissingRequiredField,

    #[error("Please enter a valid mobile number")]
    InvalidPhone,

    #[error("Please enter a valid email address")]
    InvalidEmail,
}

/// A visitor's request for a consultation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsultationRequest {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub loan_type: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl ConsultationRequest {
    /// Checks required fields, then the mobile number, then the email if one was given.
    pub fn validate(&self) -> Result<(), ConsultationError> {
        if self.name.is_empty() || self.phone.is_empty() || self.loan_type.is_empty() {
            return Err(ConsultationError::MissingRequiredField);
        }

        if !MOBILE_PHONE.is_match(&self.normalized_phone()) {
            return Err(ConsultationError::InvalidPhone);
        }

        match self.email.as_deref() {
            Some(email) if !email.is_empty() && !EMAIL.is_match(email) => {
                Err(ConsultationError::InvalidEmail)
            }
            _ => Ok(()),
        }
    }

    /// Phone number with dashes and whitespace removed.
    pub fn normalized_phone(&self) -> String {
        PHONE_SEPARATORS.replace_all(&self.phone, "").into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn request() -> ConsultationRequest {
        ConsultationRequest {
            name: "王小明".to_string(),
            phone: "0912-345-678".to_string(),
            email: None,
            loan_type: "first-home".to_string(),
            message: None,
        }
    }

    #[rstest]
    fn test_valid_request(request: ConsultationRequest) {
        assert_eq!(request.validate(), Ok(()));
        assert_eq!(request.normalized_phone(), "0912345678");
    }

    #[rstest]
    #[case("", "0912345678", "sme")]
    #[case("王小明", "", "sme")]
    #[case("王小明", "0912345678", "")]
    fn test_missing_required_fields(
        #[case] name: &str,
        #[case] phone: &str,
        #[case] loan_type: &str,
    ) {
        let request = ConsultationRequest {
            name: name.to_string(),
            phone: phone.to_string(),
            loan_type: loan_type.to_string(),
            ..Default::default()
        };
        assert_eq!(request.validate(), Err(ConsultationError::MissingRequiredField));
    }

    #[rstest]
    #[case("0912 345 678", true)]
    #[case("0912345678", true)]
    #[case("02-2345-6789", false)]
    #[case("091234567", false)]
    #[case("09123456789", false)]
    #[case("+886912345678", false)]
    #[case("09ab345678", false)]
    fn test_phone_format(
        mut request: ConsultationRequest,
        #[case] phone: &str,
        #[case] valid: bool,
    ) {
        request.phone = phone.to_string();
        assert_eq!(request.validate().is_ok(), valid);
    }

    #[rstest]
    #[case(Some(""), true)]
    #[case(Some("someone@example.com"), true)]
    #[case(Some("someone@example"), false)]
    #[case(Some("some one@example.com"), false)]
    #[case(Some("@example.com"), false)]
    #[case(None, true)]
    fn test_email_format(
        mut request: ConsultationRequest,
        #[case] email: Option<&str>,
        #[case] valid: bool,
    ) {
        request.email = email.map(str::to_string);
        let result = request.validate();
        if valid {
            assert_eq!(result, Ok(()));
        } else {
            assert_eq!(result, Err(ConsultationError::InvalidEmail));
        }
    }

    #[test]
    fn test_deserialize_without_optional_fields() {
        let json = r#"{"name": "Lin", "phone": "0987654321", "loan_type": "student"}"#;
        let request: ConsultationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.email, None);
        assert!(request.validate().is_ok());
    }
}
