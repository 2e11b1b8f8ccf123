// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory broker
//!
//! A process-local [`MessageTransport`] with the same routing rules as the
//! NATS transport:
//!
//! - plain subscribers each receive a copy of every message on their subject
//! - queue-group members share deliveries round-robin
//! - an exchange correlates its reply by id and gives up after its timeout
//!
//! It also keeps a log of every publish and every exchange request so tests
//! can assert on broker traffic, and it lets tests install responders that
//! answer exchange requests synchronously.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{Delivery, DeliveryStream, MessageTransport};
use crate::errors::{MessagingError, MessagingResult};
use crate::subjects::subject_for;

type Responder = Arc<dyn Fn(Bytes) -> Option<Bytes> + Send + Sync>;

/// A message observed by the in-memory broker
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedMessage {
    /// Destination subject
    pub subject: String,
    /// Raw payload
    pub payload: Bytes,
    /// Reply subject, when one was attached
    pub reply_to: Option<String>,
}

impl PublishedMessage {
    /// Decode the payload as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.payload)
    }
}

struct Subscription {
    queue: Option<String>,
    sender: mpsc::UnboundedSender<Delivery>,
}

#[derive(Default)]
struct Inner {
    subscriptions: Mutex<HashMap<String, Vec<Subscription>>>,
    responders: Mutex<HashMap<String, Responder>>,
    pending: Mutex<HashMap<String, oneshot::Sender<Bytes>>>,
    published: Mutex<Vec<PublishedMessage>>,
    requests: Mutex<Vec<PublishedMessage>>,
    round_robin: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-local broker
#[derive(Clone, Default)]
pub struct InMemoryTransport {
    inner: Arc<Inner>,
}

impl InMemoryTransport {
    /// Create an empty broker
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer exchange requests on `subject` with `responder`
    ///
    /// Returning `None` from the responder models a service that stays
    /// silent, so the requester runs into its timeout.
    pub fn respond_with<F>(&self, subject: impl Into<String>, responder: F)
    where
        F: Fn(Bytes) -> Option<Bytes> + Send + Sync + 'static,
    {
        lock(&self.inner.responders).insert(subject.into(), Arc::new(responder));
    }

    /// Every fire-and-forget publish so far
    pub fn published(&self) -> Vec<PublishedMessage> {
        lock(&self.inner.published).clone()
    }

    /// Publishes observed on one subject
    pub fn published_on(&self, subject: &str) -> Vec<PublishedMessage> {
        lock(&self.inner.published)
            .iter()
            .filter(|m| m.subject == subject)
            .cloned()
            .collect()
    }

    /// Exchange requests observed on one subject
    pub fn requests_on(&self, subject: &str) -> Vec<PublishedMessage> {
        lock(&self.inner.requests)
            .iter()
            .filter(|m| m.subject == subject)
            .cloned()
            .collect()
    }

    /// Forget all recorded traffic
    pub fn clear_log(&self) {
        lock(&self.inner.published).clear();
        lock(&self.inner.requests).clear();
    }

    /// Route a delivery to subscribers; returns how many received it
    fn route(&self, delivery: Delivery) -> usize {
        let mut subscriptions = lock(&self.inner.subscriptions);
        let Some(subscribers) = subscriptions.get_mut(&delivery.subject) else {
            return 0;
        };

        subscribers.retain(|s| !s.sender.is_closed());

        let mut delivered = 0;
        let mut groups: HashMap<&str, Vec<&Subscription>> = HashMap::new();

        for subscription in subscribers.iter() {
            match &subscription.queue {
                Some(queue) => groups.entry(queue.as_str()).or_default().push(subscription),
                None => {
                    if subscription.sender.send(delivery.clone()).is_ok() {
                        delivered += 1;
                    }
                }
            }
        }

        for members in groups.values() {
            let turn = self.inner.round_robin.fetch_add(1, Ordering::Relaxed);
            let member = members[turn % members.len()];
            if member.sender.send(delivery.clone()).is_ok() {
                delivered += 1;
            }
        }

        delivered
    }

    fn record(&self, log: &Mutex<Vec<PublishedMessage>>, delivery: &Delivery) {
        lock(log).push(PublishedMessage {
            subject: delivery.subject.clone(),
            payload: delivery.payload.clone(),
            reply_to: delivery.reply_to.clone(),
        });
    }

    fn complete(&self, correlation_id: &str, payload: Bytes) -> bool {
        match lock(&self.inner.pending).remove(correlation_id) {
            Some(waiter) => waiter.send(payload).is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl MessageTransport for InMemoryTransport {
    async fn send(&self, payload: Bytes, routing_key: &str, exchange: &str) -> MessagingResult<()> {
        let delivery = Delivery {
            subject: subject_for(routing_key, exchange),
            payload,
            reply_to: None,
            correlation_id: None,
        };
        self.record(&self.inner.published, &delivery);
        let delivered = self.route(delivery);
        debug!(routing_key = %routing_key, exchange = %exchange, delivered, "In-memory publish");
        Ok(())
    }

    async fn send_with_reply_to(
        &self,
        payload: Bytes,
        routing_key: &str,
        exchange: &str,
        reply_to: &str,
    ) -> MessagingResult<()> {
        let delivery = Delivery {
            subject: subject_for(routing_key, exchange),
            payload,
            reply_to: Some(reply_to.to_string()),
            correlation_id: None,
        };
        self.record(&self.inner.published, &delivery);
        self.route(delivery);
        Ok(())
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
        let (waiter, reply) = oneshot::channel();
        lock(&self.inner.pending).insert(correlation_id.clone(), waiter);

        let delivery = Delivery {
            subject: subject.clone(),
            payload,
            reply_to: Some(format!("_INBOX.{}", correlation_id)),
            correlation_id: Some(correlation_id.clone()),
        };
        self.record(&self.inner.requests, &delivery);

        let responder = lock(&self.inner.responders).get(&subject).cloned();
        match responder {
            Some(responder) => {
                if let Some(answer) = responder(delivery.payload.clone()) {
                    self.complete(&correlation_id, answer);
                }
            }
            None => {
                if self.route(delivery) == 0 {
                    lock(&self.inner.pending).remove(&correlation_id);
                    return Err(MessagingError::NoResponders(subject));
                }
            }
        }

        match tokio::time::timeout(timeout, reply).await {
            Ok(Ok(answer)) => Ok(answer),
            Ok(Err(_)) => Err(MessagingError::Subscribe(format!(
                "reply channel closed for {}",
                subject
            ))),
            Err(_) => {
                lock(&self.inner.pending).remove(&correlation_id);
                warn!(subject = %subject, timeout_ms = timeout.as_millis() as u64, "Exchange timed out");
                Err(MessagingError::Timeout(subject))
            }
        }
    }

    async fn reply(&self, delivery: &Delivery, payload: Bytes) -> MessagingResult<()> {
        if let Some(correlation_id) = &delivery.correlation_id {
            if self.complete(correlation_id, payload.clone()) {
                return Ok(());
            }
        }

        match &delivery.reply_to {
            Some(reply_to) => {
                let answer = Delivery {
                    subject: reply_to.clone(),
                    payload,
                    reply_to: None,
                    correlation_id: delivery.correlation_id.clone(),
                };
                self.record(&self.inner.published, &answer);
                self.route(answer);
                Ok(())
            }
            None => Err(MessagingError::Publish(format!(
                "delivery on {} has no reply subject",
                delivery.subject
            ))),
        }
    }

    async fn subscribe(
        &self,
        routing_key: &str,
        exchange: &str,
        queue: Option<&str>,
    ) -> MessagingResult<DeliveryStream> {
        let subject = subject_for(routing_key, exchange);
        let (sender, receiver) = mpsc::unbounded_channel();

        lock(&self.inner.subscriptions)
            .entry(subject.clone())
            .or_default()
            .push(Subscription {
                queue: queue.map(str::to_string),
                sender,
            });

        debug!(subject = %subject, queue = ?queue, "In-memory subscription");
        Ok(UnboundedReceiverStream::new(receiver).boxed())
    }
}
