use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{
    model::{User, UserProfile},
    repo::UserStore,
};
use crate::{
    auth::lockout::LoginAttempts,
    error::{RepoError, UniqueField},
};

/// Process-local [`UserStore`] used by the router tests.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    fn with_user<T>(&self, id: Uuid, f: impl FnOnce(&mut User) -> T) -> Option<T> {
        let mut users = self.users.lock().unwrap();
        users.iter_mut().find(|u| u.id == id).map(f)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &User) -> Result<(), RepoError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepoError::Duplicate(UniqueField::Email));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.with_user(id, |u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn count(&self) -> Result<i64, RepoError> {
        Ok(self.users.lock().unwrap().len() as i64)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        profile: &UserProfile,
    ) -> Result<Option<User>, RepoError> {
        Ok(self.with_user(id, |u| {
            u.apply_profile(profile);
            u.clone()
        }))
    }

    async fn toggle_business(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.with_user(id, |u| {
            u.is_business = !u.is_business;
            u.clone()
        }))
    }

    async fn save_login_attempts(
        &self,
        id: Uuid,
        attempts: &LoginAttempts,
    ) -> Result<(), RepoError> {
        self.with_user(id, |u| u.login_attempts = attempts.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}
