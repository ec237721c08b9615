use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::{Name, User, UserProfile};
use crate::{
    error::ApiError,
    validation::{
        is_strong_password, required_address, Address, AddressInput, Image, ImageInput, Violations,
    },
};

pub const DEFAULT_PROFILE_ALT: &str = "Profile image";
const PASSWORD_RULE: &str = "Password must contain at least 8 characters one uppercase letter, one lowercase letter, and one special character.";

#[derive(Debug, Default, Deserialize)]
pub struct NameInput {
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub middle: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
}

impl NameInput {
    fn validate(self, v: &mut Violations) -> Name {
        Name {
            first: v.optional_text("name.first", self.first, 2),
            middle: v.optional_text("name.middle", self.middle, 2),
            last: v.optional_text("name.last", self.last, 2),
        }
    }
}

/// Request body for user registration.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<NameInput>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub image: Option<ImageInput>,
    #[serde(default)]
    pub address: Option<AddressInput>,
    #[serde(default)]
    pub is_admin: Option<bool>,
    #[serde(default)]
    pub is_business: Option<bool>,
}

/// A registration that passed validation; the password is still plain text.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: Name,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub image: Image,
    pub address: Address,
    pub is_admin: bool,
    pub is_business: bool,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<NewUser, ApiError> {
        let mut v = Violations::new();
        let name = self.name.unwrap_or_default().validate(&mut v);
        let phone = v.phone("phone", self.phone);
        let email = v.email("email", self.email);
        let password = match self.password {
            Some(p) if is_strong_password(&p) => p,
            Some(p) => {
                v.add(PASSWORD_RULE);
                p
            }
            None => {
                v.add("\"password\" is required");
                String::new()
            }
        };
        let image = self
            .image
            .unwrap_or_default()
            .validate(&mut v, DEFAULT_PROFILE_ALT);
        let address = required_address(&mut v, self.address);
        let is_business = self.is_business.unwrap_or_else(|| {
            v.add("\"isBusiness\" is required");
            false
        });
        v.into_result(NewUser {
            name,
            phone,
            email,
            password,
            image,
            address,
            is_admin: self.is_admin.unwrap_or(false),
            is_business,
        })
    }
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Credentials in the shape the login flow accepts.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    /// Malformed credentials are reported like wrong ones.
    pub fn validate(self) -> Result<Credentials, ApiError> {
        let email = self
            .email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| crate::validation::is_valid_email(e))
            .ok_or(ApiError::BadCredentials)?;
        let password = self
            .password
            .filter(|p| is_strong_password(p))
            .ok_or(ApiError::BadCredentials)?;
        Ok(Credentials { email, password })
    }
}

/// Request body for `PUT /api/users/:id`. Only `phone` is required; omitted
/// fields keep their stored values.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<NameInput>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub image: Option<ImageInput>,
    #[serde(default)]
    pub address: Option<AddressInput>,
}

impl UpdateUserRequest {
    pub fn validate(self) -> Result<UserProfile, ApiError> {
        let mut v = Violations::new();
        let name = self.name.map(|n| n.validate(&mut v));
        let phone = v.phone("phone", self.phone);
        let image = self
            .image
            .map(|i| i.validate(&mut v, DEFAULT_PROFILE_ALT));
        let address = self.address.map(|a| a.validate(&mut v));
        v.into_result(UserProfile {
            name,
            phone,
            image,
            address,
        })
    }
}

/// User as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: Name,
    pub phone: String,
    pub email: String,
    pub image: Image,
    pub address: Address,
    pub is_admin: bool,
    pub is_business: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            phone: u.phone,
            email: u.email,
            image: u.image,
            address: u.address,
            is_admin: u.is_admin,
            is_business: u.is_business,
            created_at: u.created_at,
        }
    }
}

/// Entry of the admin user directory.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: Name,
    pub email: String,
    pub is_business: bool,
}

impl From<User> for UserSummary {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            is_business: u.is_business,
        }
    }
}
