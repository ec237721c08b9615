pub mod dto;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod model;
pub mod repo;
pub mod services;

use axum::Router;

use crate::state::AppState;

pub use repo::{PgUserStore, UserStore};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
