//! Engine configuration, loaded from the environment with sane defaults.

use std::env;

use log::*;
use wl_common::parse_boolean_flag;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/washline.db";
const DEFAULT_MAX_DB_CONNECTIONS: u32 = 10;
const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub database_url: String,
    pub max_db_connections: u32,
    /// The size of the in-process event relay's channel.
    pub event_buffer_size: usize,
    /// Enables the recipient resolver's fallback chain for orders that predate the plain `shop_id`
    /// field. Leave this on until every stored order has been rewritten.
    pub legacy_shop_refs: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_db_connections: DEFAULT_MAX_DB_CONNECTIONS,
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            legacy_shop_refs: true,
        }
    }
}

impl EngineConfig {
    pub fn from_env_or_default() -> Self {
        let database_url = env::var("WASHLINE_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ WASHLINE_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let max_db_connections = env::var("WASHLINE_MAX_DB_CONNECTIONS")
            .map(|s| {
                s.parse::<u32>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid value for WASHLINE_MAX_DB_CONNECTIONS. {e} Using the default, \
                         {DEFAULT_MAX_DB_CONNECTIONS}, instead."
                    );
                    DEFAULT_MAX_DB_CONNECTIONS
                })
            })
            .ok()
            .unwrap_or(DEFAULT_MAX_DB_CONNECTIONS);
        let event_buffer_size = env::var("WASHLINE_EVENT_BUFFER_SIZE")
            .map(|s| {
                s.parse::<usize>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid value for WASHLINE_EVENT_BUFFER_SIZE. {e} Using the default, \
                         {DEFAULT_EVENT_BUFFER_SIZE}, instead."
                    );
                    DEFAULT_EVENT_BUFFER_SIZE
                })
            })
            .ok()
            .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE);
        let legacy_shop_refs = parse_boolean_flag(env::var("WASHLINE_LEGACY_SHOP_REFS").ok(), true);
        if !legacy_shop_refs {
            info!("🪛️ Legacy shop references are disabled. Orders without a plain shop_id will have no admin recipient.");
        }
        Self { database_url, max_db_connections, event_buffer_size, legacy_shop_refs }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = EngineConfig::default();
        assert_eq!(config.database_url, "sqlite://data/washline.db");
        assert_eq!(config.max_db_connections, 10);
        assert_eq!(config.event_buffer_size, 100);
        assert!(config.legacy_shop_refs);
    }
}
