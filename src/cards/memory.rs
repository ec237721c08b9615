use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{
    model::{Card, CardContent},
    repo::CardStore,
};
use crate::error::{RepoError, UniqueField};

/// Process-local [`CardStore`]; every operation runs under one lock, so the
/// uniqueness checks and the like toggle are atomic.
#[derive(Default)]
pub struct MemoryCardStore {
    cards: Mutex<Vec<Card>>,
}

fn title_taken(cards: &[Card], owner: Uuid, title: &str, except: Option<Uuid>) -> bool {
    cards.iter().any(|c| {
        c.created_by_user_id == owner && c.content.title == title && Some(c.id) != except
    })
}

#[async_trait]
impl CardStore for MemoryCardStore {
    async fn insert(&self, card: &Card) -> Result<(), RepoError> {
        let mut cards = self.cards.lock().unwrap();
        if title_taken(&cards, card.created_by_user_id, &card.content.title, None) {
            return Err(RepoError::Duplicate(UniqueField::CardTitle));
        }
        if cards.iter().any(|c| c.biz_number == card.biz_number) {
            return Err(RepoError::Duplicate(UniqueField::BizNumber));
        }
        cards.push(card.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Card>, RepoError> {
        Ok(self.cards.lock().unwrap().clone())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Card>, RepoError> {
        let cards = self.cards.lock().unwrap();
        Ok(cards
            .iter()
            .filter(|c| c.created_by_user_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list_liked_by(&self, user_id: Uuid) -> Result<Vec<Card>, RepoError> {
        let cards = self.cards.lock().unwrap();
        Ok(cards
            .iter()
            .filter(|c| c.is_liked_by(user_id))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Card>, RepoError> {
        let cards = self.cards.lock().unwrap();
        Ok(cards.iter().find(|c| c.id == id).cloned())
    }

    async fn update_content(
        &self,
        id: Uuid,
        content: &CardContent,
    ) -> Result<Option<Card>, RepoError> {
        let mut cards = self.cards.lock().unwrap();
        let Some(owner) = cards
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.created_by_user_id)
        else {
            return Ok(None);
        };
        if title_taken(&cards, owner, &content.title, Some(id)) {
            return Err(RepoError::Duplicate(UniqueField::CardTitle));
        }
        Ok(cards.iter_mut().find(|c| c.id == id).map(|c| {
            c.content = content.clone();
            c.clone()
        }))
    }

    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> Result<Option<bool>, RepoError> {
        let mut cards = self.cards.lock().unwrap();
        Ok(cards
            .iter_mut()
            .find(|c| c.id == id)
            .map(|c| c.toggle_like(user_id)))
    }

    async fn set_biz_number(&self, id: Uuid, biz_number: i64) -> Result<bool, RepoError> {
        let mut cards = self.cards.lock().unwrap();
        if cards.iter().any(|c| c.biz_number == biz_number && c.id != id) {
            return Err(RepoError::Duplicate(UniqueField::BizNumber));
        }
        Ok(cards
            .iter_mut()
            .find(|c| c.id == id)
            .map(|c| c.biz_number = biz_number)
            .is_some())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut cards = self.cards.lock().unwrap();
        let before = cards.len();
        cards.retain(|c| c.id != id);
        Ok(cards.len() < before)
    }
}
