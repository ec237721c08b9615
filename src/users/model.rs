use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::lockout::LoginAttempts,
    validation::{Address, Image},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Name {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

/// Stored user. The password hash and lockout state never leave the server;
/// responses go through [`crate::users::dto::UserResponse`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: Name,
    pub phone: String,
    pub email: String,
    pub password_hash: String,
    pub image: Image,
    pub address: Address,
    pub is_admin: bool,
    pub is_business: bool,
    pub login_attempts: LoginAttempts,
    pub created_at: OffsetDateTime,
}

/// Profile edit. `phone` is always replaced; the other fields only when sent.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub name: Option<Name>,
    pub phone: String,
    pub image: Option<Image>,
    pub address: Option<Address>,
}

impl User {
    pub fn apply_profile(&mut self, profile: &UserProfile) {
        if let Some(name) = &profile.name {
            self.name = name.clone();
        }
        self.phone = profile.phone.clone();
        if let Some(image) = &profile.image {
            self.image = image.clone();
        }
        if let Some(address) = &profile.address {
            self.address = address.clone();
        }
    }
}
