//! Back-office configuration.
//!
//! Sources, later ones winning:
//!
//! 1. built-in defaults
//! 2. optional `config/backoffice.{toml,yaml,json}`
//! 3. `TWOTAILS__*` environment variables (`TWOTAILS__DEFAULT_ROLE=customer`)

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing::debug;

use twotails_auth::DEFAULT_ROLE_NAME;
use twotails_products::FOOD_CATEGORY;

const CONFIG_FILE: &str = "config/backoffice";
const ENV_PREFIX: &str = "TWOTAILS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackofficeConfig {
    /// Role every new user gets unless one is given explicitly.
    pub default_role: String,
    /// Postgres connection string for the stock ledger. `None` keeps
    /// everything in memory.
    #[serde(default)]
    pub database_url: Option<String>,
    pub max_connections: u32,
    /// Category (with its subtree) that freshness discounts apply to.
    pub food_category: String,
}

impl Default for BackofficeConfig {
    fn default() -> Self {
        Self {
            default_role: DEFAULT_ROLE_NAME.to_string(),
            database_url: None,
            max_connections: 5,
            food_category: FOOD_CATEGORY.to_string(),
        }
    }
}

impl BackofficeConfig {
    /// Load from the default file location and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Self::defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));
        let loaded = Self::from_config(builder.build()?)?;
        debug!(default_role = %loaded.default_role, postgres = loaded.database_url.is_some(), "configuration loaded");
        Ok(loaded)
    }

    /// Deserialize an already-built `Config` (used by tests and embedders).
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("default_role", defaults.default_role)?
            .set_default("max_connections", defaults.max_connections)?
            .set_default("food_category", defaults.food_category)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_role.trim().is_empty() {
            return Err(ConfigError::Message("default_role cannot be empty".into()));
        }
        if self.food_category.trim().is_empty() {
            return Err(ConfigError::Message("food_category cannot be empty".into()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Message("max_connections must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn load_toml(toml: &str) -> Result<BackofficeConfig, ConfigError> {
        let config = BackofficeConfig::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        BackofficeConfig::from_config(config)
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = load_toml("").unwrap();
        assert_eq!(config, BackofficeConfig::default());
        assert_eq!(config.default_role, "user");
        assert_eq!(config.food_category, "Питание");
    }

    #[test]
    fn file_values_override_defaults() {
        let config = load_toml(
            r#"
            default_role = "customer"
            database_url = "postgres://localhost/twotails"
            max_connections = 12
            "#,
        )
        .unwrap();

        assert_eq!(config.default_role, "customer");
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/twotails"));
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.food_category, FOOD_CATEGORY);
    }

    #[test]
    fn blank_default_role_is_rejected() {
        assert!(load_toml(r#"default_role = "  ""#).is_err());
        assert!(load_toml("max_connections = 0").is_err());
    }
}
