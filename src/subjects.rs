// Copyright (c) 2025 - Cowboy AI, Inc.

//! Broker topology and NATS subject naming
//!
//! The services that share this broker address each other with an
//! `(exchange, routing key)` pair. On NATS the pair collapses into one
//! hierarchical subject:
//!
//! ```text
//! {exchange}.{routing_key}
//! ```
//!
//! Queues become NATS queue groups, so several directory replicas bound to the
//! same queue share its deliveries instead of each receiving a copy.
//!
//! # Examples
//!
//! ```rust
//! use resource_directory::subjects::{BrokerTopology, Route};
//!
//! let route = Route::new("resource-data", "resource.new");
//! assert_eq!(route.subject(), "resource-data.resource.new");
//!
//! let topology = BrokerTopology::default();
//! assert_eq!(topology.new_resource.exchange, topology.data_exchange);
//! ```

use std::fmt;

/// A routing destination: an exchange plus a routing key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    /// Exchange name
    pub exchange: String,
    /// Routing key within the exchange
    pub routing_key: String,
}

impl Route {
    /// Create a route
    pub fn new(exchange: impl Into<String>, routing_key: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            routing_key: routing_key.into(),
        }
    }

    /// NATS subject for this route
    pub fn subject(&self) -> String {
        subject_for(&self.routing_key, &self.exchange)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.exchange, self.routing_key)
    }
}

/// Build the NATS subject for a routing key on an exchange
pub fn subject_for(routing_key: &str, exchange: &str) -> String {
    if exchange.is_empty() {
        routing_key.to_string()
    } else {
        format!("{}.{}", exchange, routing_key)
    }
}

/// An inbound binding: a route plus the queue consumers share
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueBinding {
    /// Route the queue is bound to
    pub route: Route,
    /// Queue (queue group) name
    pub queue: String,
}

impl QueueBinding {
    pub fn new(route: Route, queue: impl Into<String>) -> Self {
        Self {
            route,
            queue: queue.into(),
        }
    }
}

/// Every exchange, routing key and queue the directory touches
///
/// Names are resolved from configuration; the defaults match a local
/// development broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerTopology {
    /// Shared exchange carrying resource data
    pub data_exchange: String,
    /// Outbound new/updated-resource events
    pub new_resource: Route,
    /// Inbound assignment messages from the scheduler
    pub assignment: QueueBinding,
    /// Inbound deallocation messages from the scheduler
    pub deallocation: QueueBinding,
    /// Scoring service request/reply route
    pub score: Route,
    /// Identity lookups, used by the authentication collaborator
    pub security: Route,
}

impl BrokerTopology {
    /// Default topology rooted at the given exchanges
    pub fn with_exchanges(
        data_exchange: impl Into<String>,
        score_exchange: impl Into<String>,
        security_exchange: impl Into<String>,
    ) -> Self {
        let data_exchange = data_exchange.into();
        Self {
            new_resource: Route::new(data_exchange.clone(), "resource.new"),
            assignment: QueueBinding::new(
                Route::new(data_exchange.clone(), "resource.assignment"),
                "resource-assignment",
            ),
            deallocation: QueueBinding::new(
                Route::new(data_exchange.clone(), "resource.deallocation"),
                "resource-deallocation",
            ),
            score: Route::new(score_exchange, "score.request"),
            security: Route::new(security_exchange, "security.request"),
            data_exchange,
        }
    }
}

impl Default for BrokerTopology {
    fn default() -> Self {
        Self::with_exchanges("resource-data", "resource-score", "security")
    }
}
