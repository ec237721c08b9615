use serde::Deserialize;

use super::model::CardContent;
use crate::{
    error::ApiError,
    validation::{is_valid_web_url, required_address, AddressInput, ImageInput, Violations},
};

pub const DEFAULT_CARD_ALT: &str = "Site image";
pub const BIZ_NUMBER_MIN: i64 = 10_000_000;
pub const BIZ_NUMBER_MAX: i64 = 9_999_999_999;

/// Body of `POST /api/cards` and `PUT /api/cards/:id`. Any `createdByUserId`
/// in the body is ignored; ownership comes from the token.
#[derive(Debug, Default, Deserialize)]
pub struct CardRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub web: Option<String>,
    #[serde(default)]
    pub image: Option<ImageInput>,
    #[serde(default)]
    pub address: Option<AddressInput>,
}

impl CardRequest {
    pub fn validate(self) -> Result<CardContent, ApiError> {
        let mut v = Violations::new();
        let title = v.required_text("title", self.title, 2);
        let subtitle = v.required_text("subtitle", self.subtitle, 2);
        let description = v.required_text("description", self.description, 2);
        let phone = v.phone("phone", self.phone);
        let email = v.email("email", self.email);
        let web = self
            .web
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty());
        if let Some(w) = &web {
            v.check(is_valid_web_url(w), "Please enter a valid website URL");
        }
        let image = self
            .image
            .unwrap_or_default()
            .validate(&mut v, DEFAULT_CARD_ALT);
        let address = required_address(&mut v, self.address);
        v.into_result(CardContent {
            title,
            subtitle,
            description,
            phone,
            email,
            web,
            image,
            address,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BizNumberRequest {
    #[serde(default)]
    pub biz_number: Option<i64>,
}

impl BizNumberRequest {
    pub fn validate(self) -> Result<i64, ApiError> {
        let mut v = Violations::new();
        let Some(n) = self.biz_number else {
            v.add("\"bizNumber\" is required");
            return v.into_result(0);
        };
        v.check(
            (BIZ_NUMBER_MIN..=BIZ_NUMBER_MAX).contains(&n),
            format!("\"bizNumber\" must be between {BIZ_NUMBER_MIN} and {BIZ_NUMBER_MAX}"),
        );
        v.into_result(n)
    }
}
