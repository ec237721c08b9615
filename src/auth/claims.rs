use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload used for authentication. Carries no `exp`: tokens stay valid
/// until the signing secret changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid,         // user ID
    pub is_business: bool, // role flag
    pub is_admin: bool,    // role flag
    pub iat: usize,        // issued at (unix timestamp)
    pub iss: String,       // issuer
    pub aud: String,       // audience
}

impl Claims {
    pub fn is_self(&self, user_id: Uuid) -> bool {
        self.sub == user_id
    }
}
