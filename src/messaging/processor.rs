// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inbound message processing
//!
//! [`MessageProcessor`] binds a [`MessageHandler`] to its queue and runs it.
//! Every delivery becomes its own tokio task, so a slow message never holds
//! up the subscription loop, and messages for different resources are
//! handled in parallel.
//!
//! Failures are logged and the message is dropped. Redelivery and
//! dead-lettering belong to the broker.

use async_trait::async_trait;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::{Delivery, MessageTransport};
use crate::errors::MessagingResult;
use crate::subjects::QueueBinding;

/// Trait for handling typed messages from the broker
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// The type of message this handler processes
    type Message: DeserializeOwned + Send;

    /// Error produced when handling fails
    type Error: Display + Send;

    /// Handle a message
    async fn handle(&self, message: Self::Message) -> Result<(), Self::Error>;

    /// The queue binding this handler consumes from
    fn binding(&self) -> &QueueBinding;
}

/// Runs handlers against a transport's subscriptions
#[derive(Clone)]
pub struct MessageProcessor {
    transport: Arc<dyn MessageTransport>,
}

impl MessageProcessor {
    /// Create a new message processor
    pub fn new(transport: Arc<dyn MessageTransport>) -> Self {
        Self { transport }
    }

    /// Start processing messages for a specific handler
    ///
    /// The subscription is established before this returns, so messages
    /// published afterwards are guaranteed to reach the handler.
    pub async fn run_handler<H>(&self, handler: Arc<H>) -> MessagingResult<JoinHandle<()>>
    where
        H: MessageHandler + 'static,
    {
        let binding = handler.binding().clone();
        let mut deliveries = self
            .transport
            .subscribe(
                &binding.route.routing_key,
                &binding.route.exchange,
                Some(&binding.queue),
            )
            .await?;

        info!(
            subject = %binding.route,
            queue = %binding.queue,
            "Message handler started"
        );

        let handle = tokio::spawn(async move {
            while let Some(delivery) = deliveries.next().await {
                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    process_delivery(handler.as_ref(), delivery).await;
                });
            }

            warn!(subject = %binding.route, "Subscription ended");
        });

        Ok(handle)
    }
}

/// Decode and handle a single delivery
pub async fn process_delivery<H>(handler: &H, delivery: Delivery)
where
    H: MessageHandler + ?Sized,
{
    debug!(
        subject = %delivery.subject,
        payload_size = delivery.payload.len(),
        "Received message"
    );

    match serde_json::from_slice::<H::Message>(&delivery.payload) {
        Ok(message) => {
            if let Err(e) = handler.handle(message).await {
                error!("Handler error for subject {}: {}", delivery.subject, e);
            }
        }
        Err(e) => {
            error!("Failed to deserialize message on {}: {}", delivery.subject, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::InMemoryTransport;
    use crate::subjects::Route;
    use bytes::Bytes;
    use serde::Deserialize;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[derive(Debug, Deserialize)]
    struct Tick {
        n: u32,
    }

    struct Recorder {
        binding: QueueBinding,
        seen: mpsc::UnboundedSender<u32>,
    }

    #[async_trait]
    impl MessageHandler for Recorder {
        type Message = Tick;
        type Error = String;

        async fn handle(&self, message: Tick) -> Result<(), String> {
            if message.n == 0 {
                return Err("zero is not allowed".to_string());
            }
            self.seen.send(message.n).map_err(|e| e.to_string())
        }

        fn binding(&self) -> &QueueBinding {
            &self.binding
        }
    }

    #[tokio::test]
    async fn test_handler_receives_decoded_messages() {
        let transport = InMemoryTransport::new();
        let processor = MessageProcessor::new(Arc::new(transport.clone()));
        let (seen, mut received) = mpsc::unbounded_channel();
        let handler = Arc::new(Recorder {
            binding: QueueBinding::new(Route::new("data", "tick"), "ticks"),
            seen,
        });

        processor.run_handler(handler).await.unwrap();

        for payload in [&br#"{"n":0}"#[..], b"garbage", br#"{"n":5}"#] {
            transport
                .send(Bytes::copy_from_slice(payload), "tick", "data")
                .await
                .unwrap();
        }

        let n = tokio::time::timeout(Duration::from_secs(1), received.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(n, 5);
    }
}
