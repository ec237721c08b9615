use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::{Name, User, UserProfile};
use crate::{
    auth::lockout::LoginAttempts,
    error::RepoError,
    validation::{Address, Image},
};

/// Persistence for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`RepoError::Duplicate`] when the email is taken.
    async fn insert(&self, user: &User) -> Result<(), RepoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    async fn list(&self) -> Result<Vec<User>, RepoError>;
    async fn count(&self) -> Result<i64, RepoError>;
    async fn update_profile(
        &self,
        id: Uuid,
        profile: &UserProfile,
    ) -> Result<Option<User>, RepoError>;
    async fn toggle_business(&self, id: Uuid) -> Result<Option<User>, RepoError>;
    async fn save_login_attempts(
        &self,
        id: Uuid,
        attempts: &LoginAttempts,
    ) -> Result<(), RepoError>;
    /// Returns false when no such user existed.
    async fn delete(&self, id: Uuid) -> Result<bool, RepoError>;
}

/// User row in the database.
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: Json<Name>,
    phone: String,
    email: String,
    password_hash: String,
    image: Json<Image>,
    address: Json<Address>,
    is_admin: bool,
    is_business: bool,
    login_tries: Vec<OffsetDateTime>,
    blocked_until: Option<OffsetDateTime>,
    created_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            name: r.name.0,
            phone: r.phone,
            email: r.email,
            password_hash: r.password_hash,
            image: r.image.0,
            address: r.address.0,
            is_admin: r.is_admin,
            is_business: r.is_business,
            login_attempts: LoginAttempts {
                login_tries: r.login_tries,
                blocked_until: r.blocked_until,
            },
            created_at: r.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: &User) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, phone, email, password_hash, image, address,
                               is_admin, is_business, login_tries, blocked_until, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.id)
        .bind(Json(&user.name))
        .bind(&user.phone)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(Json(&user.image))
        .bind(Json(&user.address))
        .bind(user.is_admin)
        .bind(user.is_business)
        .bind(user.login_attempts.login_tries.as_slice())
        .bind(user.login_attempts.blocked_until)
        .bind(user.created_at)
        .execute(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, phone, email, password_hash, image, address,
                   is_admin, is_business, login_tries, blocked_until, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, phone, email, password_hash, image, address,
                   is_admin, is_business, login_tries, blocked_until, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::from))
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, phone, email, password_hash, image, address,
                   is_admin, is_business, login_tries, blocked_until, created_at
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn count(&self) -> Result<i64, RepoError> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;
        Ok(n)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        profile: &UserProfile,
    ) -> Result<Option<User>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
               SET name = COALESCE($2, name),
                   phone = $3,
                   image = COALESCE($4, image),
                   address = COALESCE($5, address)
             WHERE id = $1
            RETURNING id, name, phone, email, password_hash, image, address,
                      is_admin, is_business, login_tries, blocked_until, created_at
            "#,
        )
        .bind(id)
        .bind(profile.name.as_ref().map(Json))
        .bind(&profile.phone)
        .bind(profile.image.as_ref().map(Json))
        .bind(profile.address.as_ref().map(Json))
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::from))
    }

    async fn toggle_business(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
               SET is_business = NOT is_business
             WHERE id = $1
            RETURNING id, name, phone, email, password_hash, image, address,
                      is_admin, is_business, login_tries, blocked_until, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::from))
    }

    async fn save_login_attempts(
        &self,
        id: Uuid,
        attempts: &LoginAttempts,
    ) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            UPDATE users
               SET login_tries = $2, blocked_until = $3
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(attempts.login_tries.as_slice())
        .bind(attempts.blocked_until)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UniqueField;

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: Name {
                first: Some("Noa".into()),
                middle: None,
                last: Some("Levi".into()),
            },
            phone: "052-1234567".into(),
            email: email.into(),
            password_hash: "$argon2id$hash".into(),
            image: Image::with_default_alt("Profile image"),
            address: Address {
                state: None,
                country: "Israel".into(),
                city: "Tel Aviv".into(),
                street: "Herzl".into(),
                house_number: 10,
                zip: 0,
            },
            is_admin: false,
            is_business: false,
            login_attempts: LoginAttempts::default(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn duplicate_email_is_reported(pool: PgPool) {
        let store = PgUserStore::new(pool);
        store.insert(&user("noa@example.com")).await.unwrap();
        assert!(matches!(
            store.insert(&user("noa@example.com")).await,
            Err(RepoError::Duplicate(UniqueField::Email))
        ));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn profile_update_keeps_omitted_fields(pool: PgPool) {
        let store = PgUserStore::new(pool);
        let u = user("noa@example.com");
        store.insert(&u).await.unwrap();

        let profile = UserProfile {
            name: None,
            phone: "050-9999999".into(),
            image: None,
            address: None,
        };
        let updated = store.update_profile(u.id, &profile).await.unwrap().unwrap();
        assert_eq!(updated.phone, "050-9999999");
        assert_eq!(updated.name, u.name);
        assert_eq!(updated.image, u.image);
        assert_eq!(updated.address, u.address);
    }
}
