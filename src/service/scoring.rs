// Copyright (c) 2025 - Cowboy AI, Inc.
//! Score Enrichment
//!
//! Asks the external scoring service for a resource's benchmark results.
//! The call is a blocking exchange bounded by the messenger's timeout; it
//! never retries. Any outcome other than a decoded, non-null reply is a
//! [`ScoringError`] and the caller must not persist.
//!
//! ```text
//! Directory ──ScoreRequest──► {score exchange}.{score routing key}
//!           ◄──ScoreReply───  (correlated, or Timeout)
//! ```

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{ResourceType, ScoreBundle};
use crate::dto::{ScoreReply, ScoreRequest};
use crate::errors::MessagingError;
use crate::messaging::Messenger;
use crate::subjects::Route;

/// Result type for scoring calls
pub type ScoringResult<T> = Result<T, ScoringError>;

/// Why no score could be obtained
#[derive(Debug, Error)]
pub enum ScoringError {
    /// No reply within the exchange timeout
    #[error("Scoring service did not answer for '{0}' in time")]
    Timeout(String),

    /// Nobody is subscribed to the scoring route
    #[error("No scoring service listening for '{0}'")]
    NoResponders(String),

    /// The service answered with null
    #[error("Scoring service returned no score for '{0}'")]
    EmptyReply(String),

    /// The reply could not be decoded
    #[error("Invalid scoring reply for '{name}': {reason}")]
    InvalidReply { name: String, reason: String },

    /// The request never made it onto the broker
    #[error("Scoring transport error: {0}")]
    Transport(#[source] MessagingError),
}

/// Client for the scoring service
#[derive(Clone)]
pub struct ScoringClient {
    messenger: Messenger,
    route: Route,
}

impl ScoringClient {
    pub fn new(messenger: Messenger, route: Route) -> Self {
        Self { messenger, route }
    }

    /// Request the score bundle for a resource name and type
    pub async fn score(&self, name: &str, resource_type: ResourceType) -> ScoringResult<ScoreBundle> {
        let request = ScoreRequest::new(name, resource_type);

        debug!(
            resource_name = %name,
            resource_type = %resource_type,
            subject = %self.route,
            "Requesting resource score"
        );

        let reply: Option<ScoreReply> = self
            .messenger
            .exchange_request(&request, &self.route.routing_key, &self.route.exchange)
            .await
            .map_err(|e| {
                let err = match e {
                    MessagingError::Timeout(_) => ScoringError::Timeout(name.to_string()),
                    MessagingError::NoResponders(_) => ScoringError::NoResponders(name.to_string()),
                    MessagingError::Deserialization(reason) => ScoringError::InvalidReply {
                        name: name.to_string(),
                        reason,
                    },
                    other => ScoringError::Transport(other),
                };
                warn!(resource_name = %name, error = %err, "Score enrichment failed");
                err
            })?;

        match reply {
            Some(reply) => {
                debug!(resource_name = %name, score = reply.score, "Score received");
                Ok(reply.into())
            }
            None => {
                warn!(resource_name = %name, "Scoring service returned null");
                Err(ScoringError::EmptyReply(name.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::InMemoryTransport;
    use bytes::Bytes;
    use std::sync::Arc;
    use std::time::Duration;

    fn client(transport: &InMemoryTransport) -> ScoringClient {
        let messenger = Messenger::with_timeout(Arc::new(transport.clone()), Duration::from_millis(50));
        ScoringClient::new(messenger, Route::new("score", "request"))
    }

    #[tokio::test]
    async fn test_reply_becomes_bundle() {
        let transport = InMemoryTransport::new();
        transport.respond_with("score.request", |_| {
            Some(Bytes::from_static(br#"{"score":10.0,"multicore_score":80.0,"cuda":3.0}"#))
        });

        let bundle = client(&transport).score("box", ResourceType::Cpu).await.unwrap();

        assert_eq!(bundle.single_core, 10.0);
        assert_eq!(bundle.multicore, 80.0);
        assert_eq!(bundle.cuda, 3.0);

        let requests = transport.requests_on("score.request");
        let sent: ScoreRequest = requests[0].json().unwrap();
        assert_eq!(sent, ScoreRequest::new("box", ResourceType::Cpu));
    }

    #[tokio::test]
    async fn test_failure_modes() {
        let transport = InMemoryTransport::new();
        let scoring = client(&transport);

        let err = scoring.score("box", ResourceType::Gpu).await.unwrap_err();
        assert!(matches!(err, ScoringError::NoResponders(_)));

        transport.respond_with("score.request", |_| None);
        let err = scoring.score("box", ResourceType::Gpu).await.unwrap_err();
        assert!(matches!(err, ScoringError::Timeout(_)));

        transport.respond_with("score.request", |_| Some(Bytes::from_static(b"null")));
        let err = scoring.score("box", ResourceType::Gpu).await.unwrap_err();
        assert!(matches!(err, ScoringError::EmptyReply(_)));

        transport.respond_with("score.request", |_| Some(Bytes::from_static(b"{oops")));
        let err = scoring.score("box", ResourceType::Gpu).await.unwrap_err();
        assert!(matches!(err, ScoringError::InvalidReply { .. }));
    }

    #[test]
    fn test_transport_failure_keeps_its_cause() {
        use std::error::Error as _;

        let err = ScoringError::Transport(MessagingError::Publish("broker down".to_string()));
        let cause = err.source().map(|e| e.to_string());
        assert_eq!(cause.as_deref(), Some("Publish error: broker down"));
    }
}
