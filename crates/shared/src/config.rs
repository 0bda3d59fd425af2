//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger sentinels and list defaults.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Apply pending migrations on server start.
    #[serde(default)]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    /// Single-connection configuration for a private in-memory SQLite database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            run_migrations: true,
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Designated rows the ledger rules depend on, referenced by title.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Category that receives the expenses of a deleted category.
    #[serde(default = "default_catch_all_category")]
    pub catch_all_category: String,
    /// Budget type whose lines are netted out of the monthly totals.
    #[serde(default = "default_income_budget_type")]
    pub income_budget_type: String,
    /// Row limit for list endpoints called without an explicit limit.
    #[serde(default = "default_list_limit")]
    pub default_list_limit: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            catch_all_category: default_catch_all_category(),
            income_budget_type: default_income_budget_type(),
            default_list_limit: default_list_limit(),
        }
    }
}

fn default_catch_all_category() -> String {
    "Other".to_string()
}

fn default_income_budget_type() -> String {
    "Income".to_string()
}

fn default_list_limit() -> u64 {
    50
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("POCKETBOOK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment_with_defaults() {
        temp_env::with_vars(
            [
                ("POCKETBOOK__DATABASE__URL", Some("postgres://localhost/pocketbook")),
                ("POCKETBOOK__SERVER__PORT", Some("4000")),
                ("RUN_MODE", Some("test-nonexistent")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.database.url, "postgres://localhost/pocketbook");
                assert_eq!(config.server.port, 4000);
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.database.max_connections, 10);
                assert!(!config.database.run_migrations);
                assert_eq!(config.ledger.catch_all_category, "Other");
                assert_eq!(config.ledger.income_budget_type, "Income");
                assert_eq!(config.ledger.default_list_limit, 50);
            },
        );
    }

    #[test]
    fn test_ledger_overrides() {
        temp_env::with_vars(
            [
                ("POCKETBOOK__DATABASE__URL", Some("sqlite::memory:")),
                ("POCKETBOOK__LEDGER__CATCH_ALL_CATEGORY", Some("Misc")),
                ("POCKETBOOK__LEDGER__DEFAULT_LIST_LIMIT", Some("10")),
                ("RUN_MODE", Some("test-nonexistent")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.ledger.catch_all_category, "Misc");
                assert_eq!(config.ledger.income_budget_type, "Income");
                assert_eq!(config.ledger.default_list_limit, 10);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("POCKETBOOK__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test-nonexistent")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }

    #[test]
    fn test_in_memory_database_is_single_connection() {
        let db = DatabaseConfig::in_memory();
        assert_eq!(db.max_connections, 1);
        assert!(db.url.starts_with("sqlite::memory:"));
    }
}
