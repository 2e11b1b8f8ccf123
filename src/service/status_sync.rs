// Copyright (c) 2025 - Cowboy AI, Inc.
//! Status Synchronization
//!
//! The scheduler tells the directory when a resource takes or releases
//! work. Two message kinds arrive on two queues of the data exchange:
//!
//! - **assignment**: usually `{id, BUSY, taskId}`
//! - **deallocation**: usually `{id, AVAILABLE, null}`
//!
//! Both share a shape and are applied the same way. Delivery is
//! at-least-once, so applying a message is idempotent: a redelivered
//! message finds the record already in its target state and changes
//! nothing.
//!
//! # Task id rule
//!
//! A present `currentTaskId` is always taken. An absent one clears the
//! stored task id for AVAILABLE and UNAVAILABLE and keeps it for BUSY.
//!
//! # Ordering
//!
//! Each delivery runs in its own task. Messages for the same resource may
//! be applied in any order; the last write wins. A status write names
//! only `status` and `currentTaskId`, so it never reverts a concurrent
//! client attribute update.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::{Resource, TaskChange};
use crate::dto::ResourceStatusMessage;
use crate::errors::{MessagingResult, StorageError};
use crate::messaging::{MessageHandler, MessageProcessor};
use crate::repository::{ResourceRepository, StatusWrite};
use crate::subjects::{BrokerTopology, QueueBinding};

/// Result type for status synchronization
pub type StatusSyncResult<T> = Result<T, StatusSyncError>;

/// Failures while applying a status message
#[derive(Debug, Error)]
pub enum StatusSyncError {
    /// The message names a resource the directory does not know
    #[error("{channel} for unknown resource {id}")]
    NotFound { channel: StatusChannel, id: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Which inbound queue a status message came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusChannel {
    Assignment,
    Deallocation,
}

impl fmt::Display for StatusChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assignment => f.write_str("assignment"),
            Self::Deallocation => f.write_str("deallocation"),
        }
    }
}

/// What applying a message did
#[derive(Debug, Clone, PartialEq)]
pub enum StatusOutcome {
    /// The record changed and was saved
    Applied(Resource),
    /// The record was already in the target state
    Unchanged(Resource),
}

impl StatusOutcome {
    pub fn resource(&self) -> &Resource {
        match self {
            Self::Applied(resource) | Self::Unchanged(resource) => resource,
        }
    }

    pub fn was_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Applies scheduler status messages to the repository
#[derive(Clone)]
pub struct StatusSynchronizer {
    repository: Arc<dyn ResourceRepository>,
}

impl StatusSynchronizer {
    pub fn new(repository: Arc<dyn ResourceRepository>) -> Self {
        Self { repository }
    }

    pub async fn apply_assignment(
        &self,
        message: ResourceStatusMessage,
    ) -> StatusSyncResult<StatusOutcome> {
        self.apply(StatusChannel::Assignment, message).await
    }

    pub async fn apply_deallocation(
        &self,
        message: ResourceStatusMessage,
    ) -> StatusSyncResult<StatusOutcome> {
        self.apply(StatusChannel::Deallocation, message).await
    }

    /// Apply one status message
    pub async fn apply(
        &self,
        channel: StatusChannel,
        message: ResourceStatusMessage,
    ) -> StatusSyncResult<StatusOutcome> {
        let ResourceStatusMessage {
            id,
            status,
            current_task_id,
        } = message;

        let task = TaskChange::for_message(status, current_task_id);
        let Some(StatusWrite { resource, changed }) =
            self.repository.update_status(&id, status, task).await?
        else {
            return Err(StatusSyncError::NotFound { channel, id });
        };

        if !changed {
            debug!(resource_id = %id, %channel, status = %status, "Status already applied");
            return Ok(StatusOutcome::Unchanged(resource));
        }

        info!(
            resource_id = %id,
            %channel,
            status = %resource.status,
            current_task_id = ?resource.current_task_id,
            "Resource status synchronized"
        );
        Ok(StatusOutcome::Applied(resource))
    }
}

/// Broker handler for one status queue
pub struct StatusHandler {
    channel: StatusChannel,
    binding: QueueBinding,
    synchronizer: StatusSynchronizer,
}

impl StatusHandler {
    pub fn new(channel: StatusChannel, binding: QueueBinding, synchronizer: StatusSynchronizer) -> Self {
        Self {
            channel,
            binding,
            synchronizer,
        }
    }
}

#[async_trait]
impl MessageHandler for StatusHandler {
    type Message = ResourceStatusMessage;
    type Error = StatusSyncError;

    async fn handle(&self, message: ResourceStatusMessage) -> StatusSyncResult<()> {
        self.synchronizer.apply(self.channel, message).await.map(|_| ())
    }

    fn binding(&self) -> &QueueBinding {
        &self.binding
    }
}

/// Subscribe to the assignment and deallocation queues
///
/// Both subscriptions are live when this returns.
pub async fn spawn_status_listeners(
    processor: &MessageProcessor,
    synchronizer: StatusSynchronizer,
    topology: &BrokerTopology,
) -> MessagingResult<Vec<JoinHandle<()>>> {
    let handlers = [
        StatusHandler::new(
            StatusChannel::Assignment,
            topology.assignment.clone(),
            synchronizer.clone(),
        ),
        StatusHandler::new(
            StatusChannel::Deallocation,
            topology.deallocation.clone(),
            synchronizer,
        ),
    ];

    let mut tasks = Vec::with_capacity(handlers.len());
    for handler in handlers {
        tasks.push(processor.run_handler(Arc::new(handler)).await?);
    }
    Ok(tasks)
}
