// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service configuration
//!
//! Everything is read from environment variables with local-development
//! defaults:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `NATS_URL` | `nats://localhost:4222` (comma separated for a cluster) |
//! | `NATS_CLIENT_NAME` | `resource-directory` |
//! | `NATS_CONNECT_TIMEOUT_SECS` | `10` |
//! | `SCORE_EXCHANGE_TIMEOUT_MS` | `1000` |
//! | `DATA_EXCHANGE` | `resource-data` |
//! | `NEW_RESOURCE_ROUTING_KEY` | `resource.new` |
//! | `ASSIGNMENT_ROUTING_KEY` / `ASSIGNMENT_QUEUE` | `resource.assignment` / `resource-assignment` |
//! | `DEALLOCATION_ROUTING_KEY` / `DEALLOCATION_QUEUE` | `resource.deallocation` / `resource-deallocation` |
//! | `SCORE_EXCHANGE` / `SCORE_ROUTING_KEY` | `resource-score` / `score.request` |
//! | `SECURITY_EXCHANGE` / `SECURITY_ROUTING_KEY` | `security` / `security.request` |
//! | `STORAGE_BACKEND` | `memory` (or `mongodb`) |
//! | `MONGODB_URI` / `MONGODB_DATABASE` | `mongodb://localhost:27017` / `resource-directory` |

use std::time::Duration;
use thiserror::Error;

use crate::messaging::DEFAULT_EXCHANGE_TIMEOUT;
use crate::nats::NatsConfig;
use crate::subjects::{BrokerTopology, QueueBinding, Route};

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("unknown STORAGE_BACKEND '{0}', expected 'memory' or 'mongodb'")]
    UnknownBackend(String),
}

/// Where resources are persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    MongoDb { uri: String, database: String },
}

/// Full service configuration
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub nats: NatsConfig,
    /// Bound on each score exchange
    pub exchange_timeout: Duration,
    pub topology: BrokerTopology,
    pub storage: StorageBackend,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig::default(),
            exchange_timeout: DEFAULT_EXCHANGE_TIMEOUT,
            topology: BrokerTopology::default(),
            storage: StorageBackend::Memory,
        }
    }
}

impl DirectoryConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let number = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            match lookup(key) {
                Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                    var: key,
                    value,
                }),
                None => Ok(default),
            }
        };

        let defaults = Self::default();

        let nats = NatsConfig {
            servers: text("NATS_URL", &defaults.nats.servers.join(","))
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            name: text("NATS_CLIENT_NAME", &defaults.nats.name),
            connect_timeout: Duration::from_secs(number(
                "NATS_CONNECT_TIMEOUT_SECS",
                defaults.nats.connect_timeout.as_secs(),
            )?),
            request_timeout: defaults.nats.request_timeout,
        };

        let exchange_timeout = Duration::from_millis(number(
            "SCORE_EXCHANGE_TIMEOUT_MS",
            defaults.exchange_timeout.as_millis() as u64,
        )?);

        let base = defaults.topology;
        let data_exchange = text("DATA_EXCHANGE", &base.data_exchange);
        let topology = BrokerTopology {
            new_resource: Route::new(
                data_exchange.clone(),
                text("NEW_RESOURCE_ROUTING_KEY", &base.new_resource.routing_key),
            ),
            assignment: QueueBinding::new(
                Route::new(
                    data_exchange.clone(),
                    text("ASSIGNMENT_ROUTING_KEY", &base.assignment.route.routing_key),
                ),
                text("ASSIGNMENT_QUEUE", &base.assignment.queue),
            ),
            deallocation: QueueBinding::new(
                Route::new(
                    data_exchange.clone(),
                    text("DEALLOCATION_ROUTING_KEY", &base.deallocation.route.routing_key),
                ),
                text("DEALLOCATION_QUEUE", &base.deallocation.queue),
            ),
            score: Route::new(
                text("SCORE_EXCHANGE", &base.score.exchange),
                text("SCORE_ROUTING_KEY", &base.score.routing_key),
            ),
            security: Route::new(
                text("SECURITY_EXCHANGE", &base.security.exchange),
                text("SECURITY_ROUTING_KEY", &base.security.routing_key),
            ),
            data_exchange,
        };

        let storage = match text("STORAGE_BACKEND", "memory").to_ascii_lowercase().as_str() {
            "memory" => StorageBackend::Memory,
            "mongodb" | "mongo" => StorageBackend::MongoDb {
                uri: text("MONGODB_URI", "mongodb://localhost:27017"),
                database: text("MONGODB_DATABASE", "resource-directory"),
            },
            other => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        Ok(Self {
            nats,
            exchange_timeout,
            topology,
            storage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<DirectoryConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DirectoryConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.nats.servers, vec!["nats://localhost:4222"]);
        assert_eq!(config.exchange_timeout, Duration::from_millis(1000));
        assert_eq!(config.topology, BrokerTopology::default());
        assert_eq!(config.storage, StorageBackend::Memory);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("NATS_URL", "nats://a:4222, nats://b:4222"),
            ("SCORE_EXCHANGE_TIMEOUT_MS", "250"),
            ("DATA_EXCHANGE", "fleet"),
            ("ASSIGNMENT_QUEUE", "assign-q"),
            ("STORAGE_BACKEND", "MongoDB"),
            ("MONGODB_DATABASE", "fleet-db"),
        ])
        .unwrap();

        assert_eq!(config.nats.servers, vec!["nats://a:4222", "nats://b:4222"]);
        assert_eq!(config.exchange_timeout, Duration::from_millis(250));
        assert_eq!(config.topology.new_resource.subject(), "fleet.resource.new");
        assert_eq!(config.topology.assignment.queue, "assign-q");
        assert_eq!(config.topology.deallocation.route.exchange, "fleet");
        assert_eq!(
            config.storage,
            StorageBackend::MongoDb {
                uri: "mongodb://localhost:27017".to_string(),
                database: "fleet-db".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            config_from(&[("SCORE_EXCHANGE_TIMEOUT_MS", "soon")]).unwrap_err(),
            ConfigError::InvalidNumber {
                var: "SCORE_EXCHANGE_TIMEOUT_MS",
                value: "soon".to_string(),
            }
        );
        assert!(matches!(
            config_from(&[("STORAGE_BACKEND", "postgres")]),
            Err(ConfigError::UnknownBackend(_))
        ));
    }
}
