//! NATS client abstraction for messaging infrastructure

use async_nats::{Client, ConnectOptions, HeaderMap, Subscriber};
use bytes::Bytes;
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::{MessagingError, MessagingResult};

/// Configuration for NATS connection
#[derive(Debug, Clone)]
pub struct NatsConfig {
    /// NATS server URLs
    pub servers: Vec<String>,
    /// Client name
    pub name: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout used by the client's own request helper
    pub request_timeout: Duration,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://localhost:4222".to_string()],
            name: "resource-directory".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// NATS client wrapper providing the raw operations the transport needs
#[derive(Clone)]
pub struct NatsClient {
    client: Client,
}

impl NatsClient {
    /// Create a new NATS client with the given configuration
    pub async fn new(config: NatsConfig) -> MessagingResult<Self> {
        let connect_options = ConnectOptions::new()
            .name(&config.name)
            .connection_timeout(config.connect_timeout)
            .request_timeout(Some(config.request_timeout));

        let client = async_nats::connect_with_options(config.servers.join(","), connect_options)
            .await
            .map_err(|e| MessagingError::NatsConnection(e.to_string()))?;

        info!("Connected to NATS at {:?}", config.servers);

        Ok(Self { client })
    }

    /// Publish a raw payload to a subject
    pub async fn publish(&self, subject: &str, payload: Bytes) -> MessagingResult<()> {
        self.client
            .publish(subject.to_string(), payload)
            .await
            .map_err(|e| MessagingError::Publish(e.to_string()))?;

        debug!("Published message to subject: {}", subject);
        Ok(())
    }

    /// Publish with headers
    pub async fn publish_with_headers(
        &self,
        subject: &str,
        headers: HeaderMap,
        payload: Bytes,
    ) -> MessagingResult<()> {
        self.client
            .publish_with_headers(subject.to_string(), headers, payload)
            .await
            .map_err(|e| MessagingError::Publish(e.to_string()))?;

        debug!("Published message with headers to subject: {}", subject);
        Ok(())
    }

    /// Publish tagged with a reply subject and headers
    pub async fn publish_with_reply(
        &self,
        subject: &str,
        reply: &str,
        headers: HeaderMap,
        payload: Bytes,
    ) -> MessagingResult<()> {
        self.client
            .publish_with_reply_and_headers(subject.to_string(), reply.to_string(), headers, payload)
            .await
            .map_err(|e| MessagingError::Publish(e.to_string()))?;

        debug!(subject = %subject, reply = %reply, "Published message with reply subject");
        Ok(())
    }

    /// Subscribe to a subject
    pub async fn subscribe(&self, subject: &str) -> MessagingResult<Subscriber> {
        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| MessagingError::Subscribe(e.to_string()))?;

        debug!("Subscribed to subject: {}", subject);
        Ok(subscriber)
    }

    /// Subscribe as a member of a queue group
    pub async fn queue_subscribe(&self, subject: &str, queue: &str) -> MessagingResult<Subscriber> {
        let subscriber = self
            .client
            .queue_subscribe(subject.to_string(), queue.to_string())
            .await
            .map_err(|e| MessagingError::Subscribe(e.to_string()))?;

        info!(subject = %subject, queue = %queue, "Joined queue group");
        Ok(subscriber)
    }

    /// Fresh private inbox subject
    pub fn new_inbox(&self) -> String {
        self.client.new_inbox()
    }
}
