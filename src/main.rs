mod app;
mod auth;
mod cards;
mod config;
mod db;
mod error;
mod logging;
mod rate_limit;
mod seed;
mod state;
#[cfg(test)]
mod test_support;
mod users;
mod validation;

use crate::config::{load_env_files, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env_files();
    let config = AppConfig::from_env()?;
    let _log_guard = logging::init(&config)?;
    tracing::info!(environment = ?config.environment, "starting bizcards");

    let addr = config.bind_addr();
    let seed_initial_data = config.seed_initial_data;
    let app_state = state::AppState::init(config).await?;

    if seed_initial_data {
        if let Err(e) = seed::seed_initial_users(&app_state).await {
            tracing::warn!(error = %e, "initial data seeding failed; continuing");
        }
    }

    let app = app::build_app(app_state)?;
    app::serve(app, &addr).await
}
