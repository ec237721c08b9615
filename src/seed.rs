use tracing::info;

use crate::{
    error::ApiError,
    state::AppState,
    users::{
        dto::{NewUser, DEFAULT_PROFILE_ALT},
        model::Name,
        services,
    },
    validation::{Address, Image},
};

const SEED_PASSWORD: &str = "Password1!";

struct SeedUser {
    first: &'static str,
    last: &'static str,
    phone: &'static str,
    email: &'static str,
    is_business: bool,
    is_admin: bool,
    city: &'static str,
    street: &'static str,
    house_number: i64,
}

const SEED_USERS: [SeedUser; 3] = [
    SeedUser {
        first: "Noa",
        last: "Levi",
        phone: "052-1234567",
        email: "noa@example.com",
        is_business: false,
        is_admin: false,
        city: "Tel Aviv",
        street: "Herzl",
        house_number: 10,
    },
    SeedUser {
        first: "Eyal",
        last: "Cohen",
        phone: "054-7654321",
        email: "eyal@biz.com",
        is_business: true,
        is_admin: false,
        city: "Haifa",
        street: "Allenby",
        house_number: 22,
    },
    SeedUser {
        first: "Dana",
        last: "Admin",
        phone: "050-9999999",
        email: "admin@admin.com",
        is_business: false,
        is_admin: true,
        city: "Jerusalem",
        street: "King George",
        house_number: 1,
    },
];

impl SeedUser {
    fn to_new_user(&self) -> NewUser {
        NewUser {
            name: Name {
                first: Some(self.first.into()),
                middle: None,
                last: Some(self.last.into()),
            },
            phone: self.phone.into(),
            email: self.email.into(),
            password: SEED_PASSWORD.into(),
            image: Image::with_default_alt(DEFAULT_PROFILE_ALT),
            address: Address {
                state: None,
                country: "Israel".into(),
                city: self.city.into(),
                street: self.street.into(),
                house_number: self.house_number,
                zip: 0,
            },
            is_admin: self.is_admin,
            is_business: self.is_business,
        }
    }
}

/// Inserts a regular, a business and an admin user when no users exist yet.
/// Returns how many users were created.
pub async fn seed_initial_users(state: &AppState) -> Result<usize, ApiError> {
    if state.users.count().await? > 0 {
        return Ok(0);
    }
    for user in &SEED_USERS {
        services::register(state, user.to_new_user()).await?;
    }
    info!(count = SEED_USERS.len(), "initial users inserted");
    Ok(SEED_USERS.len())
}
