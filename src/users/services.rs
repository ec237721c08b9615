use axum::extract::FromRef;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{Credentials, NewUser},
    model::User,
};
use crate::{
    auth::{
        lockout::LoginDecision,
        password::{hash_password, verify_password},
        JwtKeys,
    },
    error::ApiError,
    state::AppState,
};

/// Stores a validated registration and returns the new user with a session token.
pub async fn register(state: &AppState, new_user: NewUser) -> Result<(User, String), ApiError> {
    let password_hash = hash_password(&new_user.password).map_err(ApiError::Internal)?;
    let user = User {
        id: Uuid::new_v4(),
        name: new_user.name,
        phone: new_user.phone,
        email: new_user.email,
        password_hash,
        image: new_user.image,
        address: new_user.address,
        is_admin: new_user.is_admin,
        is_business: new_user.is_business,
        login_attempts: Default::default(),
        created_at: OffsetDateTime::now_utc(),
    };

    state.users.insert(&user).await.map_err(|e| {
        warn!(email = %user.email, error = %e, "registration rejected");
        ApiError::from(e)
    })?;

    let token = JwtKeys::from_ref(state)
        .issue(user.id, user.is_business, user.is_admin)
        .map_err(ApiError::Internal)?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((user, token))
}

/// Checks credentials under the lockout policy and issues a token on success.
pub async fn login(state: &AppState, creds: Credentials) -> Result<String, ApiError> {
    let Some(user) = state.users.find_by_email(&creds.email).await? else {
        warn!(email = %creds.email, "login unknown email");
        return Err(ApiError::BadCredentials);
    };

    let now = OffsetDateTime::now_utc();
    let outcome = user
        .login_attempts
        .evaluate(now, || verify_password(&creds.password, &user.password_hash))
        .map_err(ApiError::Internal)?;

    if outcome.changed {
        state
            .users
            .save_login_attempts(user.id, &outcome.attempts)
            .await?;
    }

    match outcome.decision {
        LoginDecision::Allow => {
            let token = JwtKeys::from_ref(state)
                .issue(user.id, user.is_business, user.is_admin)
                .map_err(ApiError::Internal)?;
            info!(user_id = %user.id, "user logged in");
            Ok(token)
        }
        LoginDecision::BadCredentials => {
            warn!(
                user_id = %user.id,
                failures = outcome.attempts.login_tries.len(),
                "login invalid password"
            );
            Err(ApiError::BadCredentials)
        }
        LoginDecision::Blocked { hours_left } => {
            warn!(user_id = %user.id, hours_left, "login blocked");
            Err(ApiError::Blocked { hours_left })
        }
    }
}
