use std::env;
use url::Url;

use crate::error::AppError;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const DEFAULT_DATABASE_URL: &str = "sqlite://lift-log.db?mode=rwc";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub database_url: String,
  pub max_connections: u32,
  pub gemini: GeminiConfig,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
  /// None disables plan generation; the planner reports a missing key instead
  pub api_key: Option<String>,
  pub api_base: Url,
  pub model: String,
}

impl AppConfig {
  /// Read configuration from the environment (call `dotenvy::dotenv()` first to pick up `.env`)
  pub fn from_env() -> Result<Self, AppError> {
    let database_url =
      env::var("LIFT_LOG_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    let max_connections = match env::var("LIFT_LOG_MAX_CONNECTIONS") {
      Ok(raw) => raw.parse().map_err(|_| {
        AppError::MissingConfig(format!("LIFT_LOG_MAX_CONNECTIONS is not a number: {}", raw))
      })?,
      Err(_) => DEFAULT_MAX_CONNECTIONS,
    };

    Ok(Self {
      database_url,
      max_connections,
      gemini: GeminiConfig::from_env()?,
    })
  }
}

impl GeminiConfig {
  pub fn from_env() -> Result<Self, AppError> {
    let api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.trim().is_empty());

    let raw_base =
      env::var("GEMINI_API_BASE").unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.to_string());
    let api_base = Url::parse(&raw_base)
      .map_err(|e| AppError::MissingConfig(format!("GEMINI_API_BASE is invalid ({}): {}", e, raw_base)))?;

    let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());

    Ok(Self {
      api_key,
      api_base,
      model,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  #[serial]
  fn test_defaults_when_env_empty() {
    temp_env::with_vars_unset(
      [
        "LIFT_LOG_DATABASE_URL",
        "LIFT_LOG_MAX_CONNECTIONS",
        "GEMINI_API_KEY",
        "GEMINI_API_BASE",
        "GEMINI_MODEL",
      ],
      || {
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert!(config.gemini.api_key.is_none());
        assert_eq!(config.gemini.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.gemini.api_base.host_str(), Some("generativelanguage.googleapis.com"));
      },
    );
  }

  #[test]
  #[serial]
  fn test_overrides_from_env() {
    temp_env::with_vars(
      [
        ("LIFT_LOG_DATABASE_URL", Some("sqlite::memory:")),
        ("LIFT_LOG_MAX_CONNECTIONS", Some("2")),
        ("GEMINI_API_KEY", Some("secret")),
        ("GEMINI_API_BASE", Some("http://127.0.0.1:9999/v1beta")),
        ("GEMINI_MODEL", Some("gemini-test")),
      ],
      || {
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.gemini.api_key.as_deref(), Some("secret"));
        assert_eq!(config.gemini.api_base.port(), Some(9999));
        assert_eq!(config.gemini.model, "gemini-test");
      },
    );
  }

  #[test]
  #[serial]
  fn test_invalid_values_are_config_errors() {
    temp_env::with_vars(
      [
        ("LIFT_LOG_MAX_CONNECTIONS", Some("lots")),
        ("GEMINI_API_BASE", None),
      ],
      || {
        assert!(matches!(AppConfig::from_env(), Err(AppError::MissingConfig(_))));
      },
    );

    temp_env::with_vars(
      [
        ("LIFT_LOG_MAX_CONNECTIONS", None),
        ("GEMINI_API_BASE", Some("not a url")),
      ],
      || {
        assert!(matches!(GeminiConfig::from_env(), Err(AppError::MissingConfig(_))));
      },
    );

    temp_env::with_var("GEMINI_API_KEY", Some("   "), || {
      assert!(GeminiConfig::from_env().unwrap().api_key.is_none());
    });
  }
}
