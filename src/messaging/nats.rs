// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS transport
//!
//! Implements [`MessageTransport`] on core NATS. Exchange requests get a
//! private inbox and a `Correlation-Id` header. The inbox belongs to one
//! request, so a reply without the header is taken as the answer; a reply
//! carrying a different id is discarded.

use async_nats::{HeaderMap, Message, StatusCode};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{Delivery, DeliveryStream, MessageTransport, CORRELATION_ID_HEADER};
use crate::errors::{MessagingError, MessagingResult};
use crate::nats::NatsClient;
use crate::subjects::subject_for;

/// [`MessageTransport`] backed by a NATS connection
#[derive(Clone)]
pub struct NatsTransport {
    client: NatsClient,
}

impl NatsTransport {
    pub fn new(client: NatsClient) -> Self {
        Self { client }
    }

    fn correlation_headers(correlation_id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CORRELATION_ID_HEADER, correlation_id);
        headers
    }
}

fn correlation_id_of(message: &Message) -> Option<String> {
    message
        .headers
        .as_ref()
        .and_then(|headers| headers.get(CORRELATION_ID_HEADER))
        .map(|value| value.as_str().to_string())
}

/// Whether a message on an exchange inbox answers `expected`
fn is_reply_to(message_id: Option<&str>, expected: &str) -> bool {
    message_id.map_or(true, |id| id == expected)
}

impl From<Message> for Delivery {
    fn from(message: Message) -> Self {
        let correlation_id = correlation_id_of(&message);
        Delivery {
            subject: message.subject.to_string(),
            payload: message.payload,
            reply_to: message.reply.map(|reply| reply.to_string()),
            correlation_id,
        }
    }
}

#[async_trait]
impl MessageTransport for NatsTransport {
    async fn send(&self, payload: Bytes, routing_key: &str, exchange: &str) -> MessagingResult<()> {
        let subject = subject_for(routing_key, exchange);
        self.client.publish(&subject, payload).await
    }

    async fn send_with_reply_to(
        &self,
        payload: Bytes,
        routing_key: &str,
        exchange: &str,
        reply_to: &str,
    ) -> MessagingResult<()> {
        let subject = subject_for(routing_key, exchange);
        self.client
            .publish_with_reply(&subject, reply_to, HeaderMap::new(), payload)
            .await
    }

    async fn exchange(
        &self,
        payload: Bytes,
        routing_key: &str,
        exchange: &str,
        timeout: Duration,
    ) -> MessagingResult<Bytes> {
        let subject = subject_for(routing_key, exchange);
        let correlation_id = Uuid::now_v7().to_string();
        let inbox = self.client.new_inbox();

        // Subscribe before publishing so a fast reply cannot be missed.
        let mut replies = self.client.subscribe(&inbox).await?;
        self.client
            .publish_with_reply(
                &subject,
                &inbox,
                Self::correlation_headers(&correlation_id),
                payload,
            )
            .await?;

        debug!(subject = %subject, correlation_id = %correlation_id, "Exchange request sent");

        let wait_for_reply = async {
            while let Some(message) = replies.next().await {
                if message.status == Some(StatusCode::NO_RESPONDERS) {
                    return Err(MessagingError::NoResponders(subject.clone()));
                }
                if is_reply_to(correlation_id_of(&message).as_deref(), &correlation_id) {
                    return Ok(message.payload);
                }
                warn!(subject = %subject, "Discarding uncorrelated reply");
            }
            Err(MessagingError::Subscribe(format!(
                "reply inbox closed for {}",
                subject
            )))
        };

        let outcome = tokio::time::timeout(timeout, wait_for_reply).await;
        match outcome {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    subject = %subject,
                    correlation_id = %correlation_id,
                    timeout_ms = timeout.as_millis() as u64,
                    "Exchange timed out"
                );
                Err(MessagingError::Timeout(subject))
            }
        }
    }

    async fn reply(&self, delivery: &Delivery, payload: Bytes) -> MessagingResult<()> {
        let reply_to = delivery.reply_to.as_deref().ok_or_else(|| {
            MessagingError::Publish(format!("delivery on {} has no reply subject", delivery.subject))
        })?;

        match &delivery.correlation_id {
            Some(correlation_id) => {
                self.client
                    .publish_with_headers(reply_to, Self::correlation_headers(correlation_id), payload)
                    .await
            }
            None => self.client.publish(reply_to, payload).await,
        }
    }

    async fn subscribe(
        &self,
        routing_key: &str,
        exchange: &str,
        queue: Option<&str>,
    ) -> MessagingResult<DeliveryStream> {
        let subject = subject_for(routing_key, exchange);
        let subscriber = match queue {
            Some(queue) => self.client.queue_subscribe(&subject, queue).await?,
            None => self.client.subscribe(&subject).await?,
        };

        Ok(subscriber.map(Delivery::from).boxed())
    }
}
