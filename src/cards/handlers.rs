use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{BizNumberRequest, CardRequest},
    model::Card,
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
        .route("/cards", get(list_cards).post(create_card))
        .route("/cards/my-cards", get(my_cards))
        .route("/cards/liked-cards", get(liked_cards))
        .route("/cards/biz-number/:card_id", patch(change_biz_number))
        .route(
            "/cards/:id",
            get(get_card)
                .put(update_card)
                .patch(toggle_like)
                .delete(delete_card),
        )
}

async fn load_card(state: &AppState, id: uuid::Uuid) -> Result<Card, ApiError> {
    state
        .cards
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Card was not found".into()))
}

#[instrument(skip(state))]
pub async fn list_cards(State(state): State<AppState>) -> Result<Json<Vec<Card>>, ApiError> {
    Ok(Json(state.cards.list().await?))
}

#[instrument(skip(state))]
pub async fn my_cards(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<Card>>, ApiError> {
    policy::require(
        policy::can_list_own_cards(&caller),
        "Access denied, must be business or admin to own a card",
    )?;
    Ok(Json(state.cards.list_by_owner(caller.sub).await?))
}

#[instrument(skip(state))]
pub async fn liked_cards(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<Card>>, ApiError> {
    Ok(Json(state.cards.list_liked_by(caller.sub).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_card(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    payload: Result<Json<CardRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Card>), ApiError> {
    policy::require(
        policy::can_create_card(&caller),
        "Access denied, must be a business or admin to create card",
    )?;
    let Json(body) = payload?;
    let content = body.validate()?;
    let card = services::create_card(&state, caller.sub, content).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

#[instrument(skip(state))]
pub async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Card>, ApiError> {
    let id = parse_id(&id, "card")?;
    Ok(Json(load_card(&state, id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_card(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<CardRequest>, JsonRejection>,
) -> Result<Json<Card>, ApiError> {
    let id = parse_id(&id, "card")?;
    let card = load_card(&state, id).await?;
    policy::require(
        policy::can_modify_card(&caller, card.created_by_user_id),
        "Access denied",
    )?;
    let Json(body) = payload?;
    let content = body.validate()?;
    let updated = state
        .cards
        .update_content(id, &content)
        .await?
        .ok_or_else(|| ApiError::NotFound("Card was not found".into()))?;
    info!(card_id = %id, updated_by = %caller.sub, "card updated");
    Ok(Json(updated))
}

#[instrument(skip(state))]
pub async fn toggle_like(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<&'static str, ApiError> {
    let id = parse_id(&id, "card")?;
    let liked = services::toggle_like(&state, id, caller.sub).await?;
    Ok(if liked {
        "Added card like successfully"
    } else {
        "Removed card like successfully"
    })
}

#[instrument(skip(state, payload))]
pub async fn change_biz_number(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(card_id): Path<String>,
    payload: Result<Json<BizNumberRequest>, JsonRejection>,
) -> Result<&'static str, ApiError> {
    policy::require(
        policy::can_change_biz_number(&caller),
        "Access denied, user must be business or admin",
    )?;
    let id = parse_id(&card_id, "card")?;
    let Json(body) = payload?;
    let biz_number = body.validate()?;
    services::change_biz_number(&state, id, biz_number).await?;
    Ok("Card business number was updated successfully")
}

#[instrument(skip(state))]
pub async fn delete_card(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<&'static str, ApiError> {
    let id = parse_id(&id, "card")?;
    let card = load_card(&state, id).await?;
    policy::require(
        policy::can_modify_card(&caller, card.created_by_user_id),
        "Access denied, user must own the card or be admin",
    )?;
    if !state.cards.delete(id).await? {
        return Err(ApiError::NotFound("Card was not found".into()));
    }
    info!(card_id = %id, deleted_by = %caller.sub, "card deleted");
    Ok("Card deleted successfully")
}
