// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource storage
//!
//! The directory persists through [`ResourceRepository`]. Two backends:
//!
//! - [`InMemoryResourceRepository`] - process-local map, used by tests and
//!   single-node runs
//! - `MongoResourceRepository` - the `resource` collection (feature `mongodb`)
//!
//! Writes are field-scoped. Client attribute updates never write status or
//! task id, and status writes never write attributes, so the directory and
//! the status listeners can work on the same resource concurrently.
//! Uniqueness of `(name, member_email)` is checked atomically with the write.

use async_trait::async_trait;

use crate::domain::{
    Resource, ResourcePatch, ResourceQueryFilters, ResourceStatus, ScoreBundle, TaskChange,
    VariantMismatch,
};
use crate::errors::StorageResult;

pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;

pub use memory::InMemoryResourceRepository;
#[cfg(feature = "mongodb")]
pub use mongo::MongoResourceRepository;

/// Document collection name
pub const RESOURCE_COLLECTION: &str = "resource";

/// Result of a client attribute write
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeWrite {
    /// The patch was applied; the resource as stored afterwards
    Applied(Resource),
    /// No resource has this id
    NotFound,
    /// Another resource already holds the patch's `(name, member_email)`
    Claimed,
    /// The patch targets another hardware variant
    VariantMismatch(VariantMismatch),
}

/// Result of a status write
#[derive(Debug, Clone, PartialEq)]
pub struct StatusWrite {
    /// The resource as stored afterwards
    pub resource: Resource,
    /// Whether status or task id actually changed
    pub changed: bool,
}

/// Persistence port for resources
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Resource>>;

    async fn find_by_name_and_member_email(
        &self,
        name: &str,
        member_email: &str,
    ) -> StorageResult<Option<Resource>>;

    /// Every stored resource, any status
    async fn find_all(&self) -> StorageResult<Vec<Resource>>;

    /// Resources satisfying `filters` (see [`ResourceQueryFilters::matches`])
    async fn find_matching(&self, filters: &ResourceQueryFilters) -> StorageResult<Vec<Resource>>;

    /// Store a new resource unless its `(name, member_email)` is taken
    ///
    /// Returns `false`, storing nothing, when the pair is already claimed.
    async fn insert_if_absent(&self, resource: &Resource) -> StorageResult<bool>;

    /// Apply client attributes, and fresh scores when given
    ///
    /// Status and task id are never written.
    async fn update_attributes(
        &self,
        id: &str,
        patch: ResourcePatch,
        scores: Option<ScoreBundle>,
    ) -> StorageResult<AttributeWrite>;

    /// Set status and adjust the task id; `None` when no resource has this id
    ///
    /// Client attributes and scores are never written.
    async fn update_status(
        &self,
        id: &str,
        status: ResourceStatus,
        task: TaskChange,
    ) -> StorageResult<Option<StatusWrite>>;
}
