use rand::Rng;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::BIZ_NUMBER_MIN,
    model::{Card, CardContent},
};
use crate::{
    error::{ApiError, RepoError, UniqueField},
    state::AppState,
};

/// Generated numbers stay within eight digits.
const GENERATED_BIZ_NUMBER_MAX: i64 = 99_999_999;
const BIZ_NUMBER_DRAWS: usize = 5;

fn random_biz_number() -> i64 {
    rand::thread_rng().gen_range(BIZ_NUMBER_MIN..=GENERATED_BIZ_NUMBER_MAX)
}

/// Creates a card owned by `owner_id` with a fresh random bizNumber. A
/// bizNumber collision draws again; a title collision is reported.
pub async fn create_card(
    state: &AppState,
    owner_id: Uuid,
    content: CardContent,
) -> Result<Card, ApiError> {
    let mut card = Card {
        id: Uuid::new_v4(),
        content,
        biz_number: 0,
        likes: Vec::new(),
        created_by_user_id: owner_id,
        created_at: OffsetDateTime::now_utc(),
    };

    for _ in 0..BIZ_NUMBER_DRAWS {
        card.biz_number = random_biz_number();
        match state.cards.insert(&card).await {
            Ok(()) => {
                info!(
                    card_id = %card.id,
                    owner_id = %owner_id,
                    biz_number = card.biz_number,
                    "card created"
                );
                return Ok(card);
            }
            Err(RepoError::Duplicate(UniqueField::BizNumber)) => {
                warn!(biz_number = card.biz_number, "bizNumber collision, drawing again");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(ApiError::internal(anyhow::anyhow!(
        "no free bizNumber after {BIZ_NUMBER_DRAWS} draws"
    )))
}

/// Flips the caller's like on a card. Returns whether the card is now liked.
pub async fn toggle_like(
    state: &AppState,
    card_id: Uuid,
    user_id: Uuid,
) -> Result<bool, ApiError> {
    if state.cards.find_by_id(card_id).await?.is_none() {
        return Err(ApiError::NotFound("Card id not found".into()));
    }
    if state.users.find_by_id(user_id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".into()));
    }
    let liked = state
        .cards
        .toggle_like(card_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Card id not found".into()))?;
    info!(card_id = %card_id, user_id = %user_id, liked, "card like toggled");
    Ok(liked)
}

/// Sets a card's bizNumber. A number already carried by any card, including
/// this one, is reported as in use.
pub async fn change_biz_number(
    state: &AppState,
    card_id: Uuid,
    biz_number: i64,
) -> Result<(), ApiError> {
    let card = state
        .cards
        .find_by_id(card_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Card was not found".into()))?;
    if card.biz_number == biz_number {
        return Err(RepoError::Duplicate(UniqueField::BizNumber).into());
    }
    if !state.cards.set_biz_number(card_id, biz_number).await? {
        return Err(ApiError::NotFound("Card was not found".into()));
    }
    info!(card_id = %card_id, biz_number, "card bizNumber changed");
    Ok(())
}
