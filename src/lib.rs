//! Resource directory for donated compute
//!
//! Tracks member-donated CPU, GPU and SoC resources and keeps their
//! scheduling state consistent with the other services on the broker:
//! scores come from a blocking request/reply exchange with the scoring
//! service, and status changes arrive asynchronously from the scheduler.

pub mod config;
pub mod domain;
pub mod dto;
pub mod errors;
pub mod messaging;
pub mod nats;
pub mod repository;
pub mod service;
pub mod subjects;

// Re-export commonly used types
pub use config::{ConfigError, DirectoryConfig, StorageBackend};
pub use domain::{Resource, ResourceQueryFilters, ResourceStatus, ResourceType};
pub use dto::ResourceDto;
pub use errors::{MessagingError, MessagingResult, StorageError, StorageResult};
pub use messaging::{InMemoryTransport, MessageTransport, Messenger, NatsTransport};
pub use nats::{NatsClient, NatsConfig};
pub use repository::{InMemoryResourceRepository, ResourceRepository};
pub use service::{
    DirectoryError, DirectoryResult, ResourceDirectory, ResourceDirectoryService,
    StatusSynchronizer,
};
