use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::{Card, CardContent};
use crate::{
    error::RepoError,
    validation::{Address, Image},
};

/// Persistence for cards. Uniqueness of `(createdByUserId, title)` and of
/// `bizNumber` is enforced by the store and reported as [`RepoError::Duplicate`].
#[async_trait]
pub trait CardStore: Send + Sync {
    async fn insert(&self, card: &Card) -> Result<(), RepoError>;
    async fn list(&self) -> Result<Vec<Card>, RepoError>;
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Card>, RepoError>;
    async fn list_liked_by(&self, user_id: Uuid) -> Result<Vec<Card>, RepoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Card>, RepoError>;
    async fn update_content(
        &self,
        id: Uuid,
        content: &CardContent,
    ) -> Result<Option<Card>, RepoError>;
    /// Atomically flips the user's like. `None` when the card does not exist,
    /// otherwise whether the card is liked afterwards.
    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> Result<Option<bool>, RepoError>;
    /// Returns false when the card does not exist.
    async fn set_biz_number(&self, id: Uuid, biz_number: i64) -> Result<bool, RepoError>;
    async fn delete(&self, id: Uuid) -> Result<bool, RepoError>;
}

#[derive(Debug, FromRow)]
struct CardRow {
    id: Uuid,
    title: String,
    subtitle: String,
    description: String,
    phone: String,
    email: String,
    web: Option<String>,
    image: Json<Image>,
    address: Json<Address>,
    biz_number: i64,
    likes: Vec<Uuid>,
    created_by_user_id: Uuid,
    created_at: OffsetDateTime,
}

impl From<CardRow> for Card {
    fn from(r: CardRow) -> Self {
        Self {
            id: r.id,
            content: CardContent {
                title: r.title,
                subtitle: r.subtitle,
                description: r.description,
                phone: r.phone,
                email: r.email,
                web: r.web,
                image: r.image.0,
                address: r.address.0,
            },
            biz_number: r.biz_number,
            likes: r.likes,
            created_by_user_id: r.created_by_user_id,
            created_at: r.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PgCardStore {
    db: PgPool,
}

impl PgCardStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn fetch_where(
        &self,
        clause: &'static str,
        id: Option<Uuid>,
    ) -> Result<Vec<Card>, RepoError> {
        let sql = format!(
            "SELECT id, title, subtitle, description, phone, email, web, image, address,
                    biz_number, likes, created_by_user_id, created_at
               FROM cards {clause}
              ORDER BY created_at ASC"
        );
        let mut query = sqlx::query_as::<_, CardRow>(&sql);
        if let Some(id) = id {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.db).await?;
        Ok(rows.into_iter().map(Card::from).collect())
    }
}

#[async_trait]
impl CardStore for PgCardStore {
    async fn insert(&self, card: &Card) -> Result<(), RepoError> {
        let c = &card.content;
        sqlx::query(
            r#"
            INSERT INTO cards (id, title, subtitle, description, phone, email, web, image,
                               address, biz_number, likes, created_by_user_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(card.id)
        .bind(&c.title)
        .bind(&c.subtitle)
        .bind(&c.description)
        .bind(&c.phone)
        .bind(&c.email)
        .bind(&c.web)
        .bind(Json(&c.image))
        .bind(Json(&c.address))
        .bind(card.biz_number)
        .bind(card.likes.as_slice())
        .bind(card.created_by_user_id)
        .bind(card.created_at)
        .execute(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Card>, RepoError> {
        self.fetch_where("", None).await
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Card>, RepoError> {
        self.fetch_where("WHERE created_by_user_id = $1", Some(owner_id))
            .await
    }

    async fn list_liked_by(&self, user_id: Uuid) -> Result<Vec<Card>, RepoError> {
        self.fetch_where("WHERE $1 = ANY(likes)", Some(user_id)).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Card>, RepoError> {
        let row = sqlx::query_as::<_, CardRow>(
            r#"
            SELECT id, title, subtitle, description, phone, email, web, image, address,
                   biz_number, likes, created_by_user_id, created_at
            FROM cards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Card::from))
    }

    async fn update_content(
        &self,
        id: Uuid,
        content: &CardContent,
    ) -> Result<Option<Card>, RepoError> {
        let row = sqlx::query_as::<_, CardRow>(
            r#"
            UPDATE cards
               SET title = $2, subtitle = $3, description = $4, phone = $5, email = $6,
                   web = $7, image = $8, address = $9
             WHERE id = $1
            RETURNING id, title, subtitle, description, phone, email, web, image, address,
                      biz_number, likes, created_by_user_id, created_at
            "#,
        )
        .bind(id)
        .bind(&content.title)
        .bind(&content.subtitle)
        .bind(&content.description)
        .bind(&content.phone)
        .bind(&content.email)
        .bind(&content.web)
        .bind(Json(&content.image))
        .bind(Json(&content.address))
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;
        Ok(row.map(Card::from))
    }

    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> Result<Option<bool>, RepoError> {
        let liked = sqlx::query_scalar::<_, bool>(
            r#"
            UPDATE cards
               SET likes = CASE
                       WHEN $2 = ANY(likes) THEN array_remove(likes, $2)
                       ELSE array_append(likes, $2)
                   END
             WHERE id = $1
            RETURNING $2 = ANY(likes)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(liked)
    }

    async fn set_biz_number(&self, id: Uuid, biz_number: i64) -> Result<bool, RepoError> {
        let res = sqlx::query("UPDATE cards SET biz_number = $2 WHERE id = $1")
            .bind(id)
            .bind(biz_number)
            .execute(&self.db)
            .await
            .map_err(RepoError::from_sqlx)?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
