pub mod analysis;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod models;
pub mod progression;
pub mod session;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use config::AppConfig;
use db::AppState;
use error::AppError;

pub use analysis::{detect_plateaus, generate_insights};
pub use progression::max_done_weight;

const DEFAULT_LOG_FILTER: &str = "lift_log=info,sqlx=warn";

/// Install the fmt subscriber. `RUST_LOG` overrides the default filter.
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

  let _ = tracing_subscriber::registry()
    .with(fmt::layer())
    .with(filter)
    .try_init();
}

/// Load `.env`, read configuration, open the database and run migrations
pub async fn bootstrap() -> Result<Arc<AppState>, AppError> {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  let config = AppConfig::from_env()?;
  let pool = db::initialize_db(&config).await?;

  tracing::info!(version = env!("CARGO_PKG_VERSION"), "lift-log ready");

  Ok(Arc::new(AppState::new(pool, config)))
}
