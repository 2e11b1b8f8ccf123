// Copyright (c) 2025 - Cowboy AI, Inc.
//! Message Transport Abstraction
//!
//! Every broker interaction in the directory goes through [`MessageTransport`],
//! a strategy trait with one capability set:
//!
//! - **send**: fire-and-forget publish to `(routing key, exchange)`
//! - **send with reply-to**: same, tagged with the subject a responder should
//!   answer on
//! - **exchange**: publish and wait for the one correlated reply, bounded by a
//!   timeout
//! - **subscribe**: inbound deliveries for a queue binding
//!
//! ```text
//! Caller ──► Messenger (JSON, typed) ──► dyn MessageTransport
//!                                          ├── NatsTransport      (async-nats)
//!                                          └── InMemoryTransport  (tests, local runs)
//! ```
//!
//! Callers hold a [`Messenger`] and never see which transport is underneath.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::errors::{MessagingError, MessagingResult};

pub mod memory;
pub mod nats;
pub mod processor;

pub use memory::{InMemoryTransport, PublishedMessage};
pub use nats::NatsTransport;
pub use processor::{MessageHandler, MessageProcessor};

/// Header carrying the request/reply correlation id
pub const CORRELATION_ID_HEADER: &str = "Correlation-Id";

/// Default bound on a blocking exchange
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_millis(1000);

/// One inbound message, transport-neutral
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Subject the message arrived on
    pub subject: String,
    /// Raw payload
    pub payload: Bytes,
    /// Where the sender expects a reply, if anywhere
    pub reply_to: Option<String>,
    /// Correlation id of the originating request
    pub correlation_id: Option<String>,
}

/// Stream of inbound deliveries for one subscription
pub type DeliveryStream = BoxStream<'static, Delivery>;

/// Pluggable broker strategy
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Fire-and-forget publish
    async fn send(&self, payload: Bytes, routing_key: &str, exchange: &str) -> MessagingResult<()>;

    /// Publish tagged with a reply destination
    async fn send_with_reply_to(
        &self,
        payload: Bytes,
        routing_key: &str,
        exchange: &str,
        reply_to: &str,
    ) -> MessagingResult<()>;

    /// Publish a request and wait for its correlated reply
    ///
    /// Returns [`MessagingError::Timeout`] if nothing correlated arrives
    /// within `timeout`. At most one reply is ever returned per request.
    async fn exchange(
        &self,
        payload: Bytes,
        routing_key: &str,
        exchange: &str,
        timeout: Duration,
    ) -> MessagingResult<Bytes>;

    /// Answer a delivery that arrived through [`MessageTransport::exchange`]
    async fn reply(&self, delivery: &Delivery, payload: Bytes) -> MessagingResult<()>;

    /// Subscribe to a route, optionally as a member of a queue group
    async fn subscribe(
        &self,
        routing_key: &str,
        exchange: &str,
        queue: Option<&str>,
    ) -> MessagingResult<DeliveryStream>;
}

/// Typed façade over a transport
///
/// Serializes outgoing messages as JSON and decodes replies into the
/// requested type.
#[derive(Clone)]
pub struct Messenger {
    transport: Arc<dyn MessageTransport>,
    exchange_timeout: Duration,
}

impl Messenger {
    /// Create a messenger with the default exchange timeout
    pub fn new(transport: Arc<dyn MessageTransport>) -> Self {
        Self::with_timeout(transport, DEFAULT_EXCHANGE_TIMEOUT)
    }

    /// Create a messenger with an explicit exchange timeout
    pub fn with_timeout(transport: Arc<dyn MessageTransport>, exchange_timeout: Duration) -> Self {
        Self {
            transport,
            exchange_timeout,
        }
    }

    /// Send a message without waiting for anything
    pub async fn send<T>(&self, message: &T, routing_key: &str, exchange: &str) -> MessagingResult<()>
    where
        T: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(message)?;
        self.transport
            .send(payload.into(), routing_key, exchange)
            .await
    }

    /// Send a message tagged with a reply destination
    pub async fn send_with_reply_to<T>(
        &self,
        message: &T,
        routing_key: &str,
        exchange: &str,
        reply_to: &str,
    ) -> MessagingResult<()>
    where
        T: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(message)?;
        self.transport
            .send_with_reply_to(payload.into(), routing_key, exchange, reply_to)
            .await
    }

    /// Request/reply with the configured timeout
    pub async fn exchange_request<T, R>(
        &self,
        message: &T,
        routing_key: &str,
        exchange: &str,
    ) -> MessagingResult<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let payload = serde_json::to_vec(message)?;
        let response = self
            .transport
            .exchange(payload.into(), routing_key, exchange, self.exchange_timeout)
            .await?;

        debug!(
            routing_key = %routing_key,
            exchange = %exchange,
            payload_size = response.len(),
            "Exchange reply received"
        );

        serde_json::from_slice(&response)
            .map_err(|e| MessagingError::Deserialization(e.to_string()))
    }
}
