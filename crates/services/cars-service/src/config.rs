//! Cars service configuration.

use std::env;
use std::str::FromStr;

use common::DatabaseConfig;

/// Cars service configuration.
#[derive(Debug, Clone, Default)]
pub struct CarsServiceConfig {
    pub database: DatabaseConfig,
}

impl CarsServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Service-prefixed variables win over the generic ones; anything
    /// missing or unparsable falls back to [`DatabaseConfig::default`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = DatabaseConfig::default();

        let database = DatabaseConfig {
            url: lookup("CARS_SERVICE_DATABASE_URL")
                .or_else(|| lookup("DATABASE_URL"))
                .unwrap_or(defaults.url),
            max_connections: parse_var(&lookup, "CARS_SERVICE_DB_MAX_CONNECTIONS")
                .unwrap_or(defaults.max_connections),
            min_connections: parse_var(&lookup, "CARS_SERVICE_DB_MIN_CONNECTIONS")
                .unwrap_or(defaults.min_connections),
            connect_timeout_secs: parse_var(&lookup, "CARS_SERVICE_DB_CONNECT_TIMEOUT_SECS")
                .unwrap_or(defaults.connect_timeout_secs),
            idle_timeout_secs: parse_var(&lookup, "CARS_SERVICE_DB_IDLE_TIMEOUT_SECS")
                .unwrap_or(defaults.idle_timeout_secs),
            sqlx_logging: parse_var(&lookup, "CARS_SERVICE_DB_SQL_LOGGING")
                .unwrap_or(defaults.sqlx_logging),
        };

        Self { database }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.parse().ok())
}
