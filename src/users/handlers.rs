use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{LoginRequest, RegisterRequest, UpdateUserRequest, UserResponse, UserSummary},
    services,
};
use crate::{
    auth::{policy, AuthUser},
    error::ApiError,
    state::AppState,
    validation::parse_id,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user)
                .put(update_user)
                .patch(toggle_business)
                .delete(delete_user),
        )
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;
    let new_user = body.validate()?;
    let (_, token) = services::register(&state, new_user).await?;
    Ok((StatusCode::CREATED, token))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<String, ApiError> {
    let Json(body) = payload.map_err(|_| ApiError::BadCredentials)?;
    let creds = body.validate()?;
    services::login(&state, creds).await
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    policy::require(policy::can_list_users(&caller), "Access denied")?;
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(UserSummary::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_id(&id, "user")?;
    policy::require(policy::can_read_user(&caller, id), "Access denied")?;
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No such user found".into()))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_id(&id, "user")?;
    policy::require(policy::can_update_user(&caller, id), "Access denied")?;
    let Json(body) = payload?;
    let profile = body.validate()?;
    let user = state
        .users
        .update_profile(id, &profile)
        .await?
        .ok_or_else(|| ApiError::NotFound("No such user found".into()))?;
    info!(user_id = %id, "user profile updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn toggle_business(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_id(&id, "user")?;
    policy::require(policy::can_update_user(&caller, id), "Access denied")?;
    let user = state
        .users
        .toggle_business(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No such user found".into()))?;
    info!(user_id = %id, is_business = user.is_business, "business status toggled");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<&'static str, ApiError> {
    let id = parse_id(&id, "user")?;
    policy::require(policy::can_delete_user(&caller, id), "Access denied")?;
    if !state.users.delete(id).await? {
        return Err(ApiError::NotFound("No such user found".into()));
    }
    info!(user_id = %id, deleted_by = %caller.sub, "user deleted");
    Ok("User was deleted")
}
