//! Structural validation shared by the user and card request bodies.
//!
//! Request DTOs keep every field optional so that a single pass can report all
//! violations at once instead of failing on the first missing key.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

pub const DEFAULT_IMAGE_URL: &str = "https://www.svgrepo.com/show/512697/profile-1341.svg";

lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(
        r"^(?:\+972[-\s]?)?(0[2-9])[-\s]?(\d{7})$|^(?:\+972[-\s]?)?(05[0-9])[-\s]?(\d{7})$"
    )
    .unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref IMAGE_URL_RE: Regex =
        Regex::new(r"^(https?://.*\.(?:png|jpg|jpeg|gif|webp|svg))(?:\?.*)?$").unwrap();
    static ref WEB_URL_RE: Regex =
        Regex::new(r"^(https?://)?(www\.)?([a-zA-Z0-9.-]+)\.([a-zA-Z]{2,})(/\S*)?$").unwrap();
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_image_url(url: &str) -> bool {
    IMAGE_URL_RE.is_match(url)
}

pub fn is_valid_web_url(url: &str) -> bool {
    WEB_URL_RE.is_match(url)
}

/// At least 8 characters with a lowercase letter, an uppercase letter and a
/// non-word character.
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| !(c.is_ascii_alphanumeric() || c == '_'))
}

/// Parses a path id, rejecting malformed values before any store lookup.
pub fn parse_id(raw: &str, kind: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {kind} ID format")))
}

/// Accumulates human-readable rule violations.
#[derive(Debug, Default)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn check(&mut self, ok: bool, message: impl Into<String>) {
        if !ok {
            self.add(message);
        }
    }

    /// Trimmed required text of at least `min` characters. Returns the value
    /// even when invalid so callers can keep building.
    pub fn required_text(&mut self, field: &str, value: Option<String>, min: usize) -> String {
        match value.map(|v| v.trim().to_string()) {
            None => {
                self.add(format!("\"{field}\" is required"));
                String::new()
            }
            Some(v) if v.is_empty() => {
                self.add(format!("\"{field}\" is not allowed to be empty"));
                v
            }
            Some(v) => {
                if v.chars().count() < min {
                    self.add(format!("\"{field}\" length must be at least {min} characters long"));
                }
                v
            }
        }
    }

    /// Optional text: missing or empty is `None`, otherwise at least `min` characters.
    pub fn optional_text(&mut self, field: &str, value: Option<String>, min: usize) -> Option<String> {
        let v = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())?;
        if v.chars().count() < min {
            self.add(format!("\"{field}\" length must be at least {min} characters long"));
        }
        Some(v)
    }

    pub fn phone(&mut self, field: &str, value: Option<String>) -> String {
        let phone = self.required_text(field, value, 9);
        if !phone.is_empty() && !is_valid_phone(&phone) {
            self.add(format!("\"{field}\" must be a valid israeli phone number"));
        }
        phone
    }

    pub fn email(&mut self, field: &str, value: Option<String>) -> String {
        let email = self.required_text(field, value, 5).to_lowercase();
        if !email.is_empty() && !is_valid_email(&email) {
            self.add(format!("\"{field}\" must be a valid email"));
        }
        email
    }

    pub fn into_result<T>(self, value: T) -> Result<T, ApiError> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(ApiError::Validation(self.0))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub alt: String,
}

impl Image {
    pub fn with_default_alt(alt: &str) -> Self {
        Self {
            url: DEFAULT_IMAGE_URL.into(),
            alt: alt.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ImageInput {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

impl ImageInput {
    /// Empty url or alt fall back to defaults.
    pub fn validate(self, v: &mut Violations, default_alt: &str) -> Image {
        let url = self
            .url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string());
        v.check(is_valid_image_url(&url), "Please enter a valid image URL");
        let alt = self
            .alt
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| default_alt.to_string());
        Image { url, alt }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub country: String,
    pub city: String,
    pub street: String,
    pub house_number: i64,
    #[serde(default)]
    pub zip: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub house_number: Option<i64>,
    #[serde(default)]
    pub zip: Option<i64>,
}

impl AddressInput {
    pub fn validate(self, v: &mut Violations) -> Address {
        let state = v.optional_text("address.state", self.state, 2);
        let country = v.required_text("address.country", self.country, 2);
        let city = v.required_text("address.city", self.city, 2);
        let street = v.required_text("address.street", self.street, 2);
        let house_number = match self.house_number {
            Some(n) => {
                v.check(n >= 1, "\"address.houseNumber\" must be greater than or equal to 1");
                n
            }
            None => {
                v.add("\"address.houseNumber\" is required");
                0
            }
        };
        let zip = self.zip.unwrap_or(0);
        v.check(zip >= 0, "\"address.zip\" must be greater than or equal to 0");
        Address {
            state,
            country,
            city,
            street,
            house_number,
            zip,
        }
    }
}

/// Validates a required nested address object.
pub fn required_address(v: &mut Violations, input: Option<AddressInput>) -> Address {
    if input.is_none() {
        v.add("\"address\" is required");
    }
    input.unwrap_or_default().validate(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_accepts_israeli_formats() {
        assert!(is_valid_phone("052-1234567"));
        assert!(is_valid_phone("0521234567"));
        assert!(!is_valid_phone("+972-52-1234567"));
        assert!(is_valid_phone("+972 0521234567"));
        assert!(is_valid_phone("03-1234567"));
        assert!(!is_valid_phone("01-1234567"));
        assert!(!is_valid_phone("12345"));
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("noa@example.com"));
        assert!(!is_valid_email("noa@example"));
        assert!(!is_valid_email("no a@example.com"));
    }

    #[test]
    fn password_strength() {
        assert!(is_strong_password("Password1!"));
        assert!(!is_strong_password("password1!"));
        assert!(!is_strong_password("PASSWORD1!"));
        assert!(!is_strong_password("Password1"));
        assert!(!is_strong_password("Pa1!"));
    }

    #[test]
    fn image_and_web_urls() {
        assert!(is_valid_image_url("https://cdn.example.com/a.png"));
        assert!(is_valid_image_url("http://x.io/pic.svg?size=2"));
        assert!(!is_valid_image_url("https://cdn.example.com/a.txt"));
        assert!(is_valid_web_url("https://www.example.co.il/about"));
        assert!(is_valid_web_url("example.com"));
        assert!(!is_valid_web_url("not a url"));
    }

    #[test]
    fn parse_id_rejects_malformed_ids() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "card").unwrap(), id);
        let err = parse_id("123abc", "card").unwrap_err();
        assert_eq!(err.to_string(), "Invalid card ID format");
    }

    #[test]
    fn image_defaults_when_empty() {
        let mut v = Violations::new();
        let image = ImageInput {
            url: Some(String::new()),
            alt: None,
        }
        .validate(&mut v, "Profile image");
        assert!(v.into_result(()).is_ok());
        assert_eq!(image, Image::with_default_alt("Profile image"));
    }

    #[test]
    fn address_collects_every_violation() {
        let mut v = Violations::new();
        let _ = AddressInput {
            country: Some("I".into()),
            house_number: Some(0),
            zip: Some(-1),
            ..Default::default()
        }
        .validate(&mut v);
        let err = v.into_result(()).unwrap_err();
        match err {
            ApiError::Validation(list) => {
                assert_eq!(list.len(), 5);
                assert!(list.iter().any(|m| m.contains("address.city")));
                assert!(list.iter().any(|m| m.contains("address.zip")));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_address_is_reported_once_plus_fields() {
        let mut v = Violations::new();
        let _ = required_address(&mut v, None);
        let ApiError::Validation(list) = v.into_result(()).unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(list[0], "\"address\" is required");
    }
}
