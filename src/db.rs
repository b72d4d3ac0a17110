use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::error::AppError;

pub type DbPool = SqlitePool;

const EVENT_BUFFER: usize = 64;

/// Change notification published after every write.
///
/// Subscribers re-fetch the affected collection and re-run whatever they derive from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
  RoutinesChanged { user_id: String },
  ExercisesChanged { user_id: String, routine_id: String },
  HistoryChanged { user_id: String },
}

impl StoreEvent {
  pub fn user_id(&self) -> &str {
    match self {
      StoreEvent::RoutinesChanged { user_id }
      | StoreEvent::ExercisesChanged { user_id, .. }
      | StoreEvent::HistoryChanged { user_id } => user_id,
    }
  }
}

/// Application state holding the database connection pool
pub struct AppState {
  pub db: DbPool,
  pub config: AppConfig,
  events: broadcast::Sender<StoreEvent>,
}

impl AppState {
  pub fn new(db: DbPool, config: AppConfig) -> Self {
    let (events, _) = broadcast::channel(EVENT_BUFFER);
    Self { db, config, events }
  }

  /// Receive every StoreEvent published after this call
  pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
    self.events.subscribe()
  }

  pub(crate) fn publish(&self, event: StoreEvent) {
    tracing::debug!(?event, "store changed");
    // No receivers is fine, nobody is watching yet
    let _ = self.events.send(event);
  }
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(config: &AppConfig) -> Result<DbPool, AppError> {
  tracing::info!(url = %config.database_url, "initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(config.max_connections)
    .connect(&config.database_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  tracing::info!("database ready");

  Ok(pool)
}
