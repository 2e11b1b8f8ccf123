// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory resource store
//!
//! Every write runs as one mutation under the map's write lock, so a
//! uniqueness check and the write it guards cannot interleave with another
//! writer.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::{AttributeWrite, ResourceRepository, StatusWrite};
use crate::domain::{
    Resource, ResourcePatch, ResourceQueryFilters, ResourceStatus, ScoreBundle, TaskChange,
};
use crate::errors::StorageResult;

/// Resources keyed by id
///
/// Ids are UUID v7, so iteration order is creation order.
#[derive(Clone, Default)]
pub struct InMemoryResourceRepository {
    resources: Arc<RwLock<BTreeMap<String, Resource>>>,
}

impl InMemoryResourceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored resources
    pub async fn len(&self) -> usize {
        self.resources.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.resources.read().await.is_empty()
    }
}

fn claimed_by_other(
    resources: &BTreeMap<String, Resource>,
    name: &str,
    member_email: &str,
    own_id: &str,
) -> bool {
    resources
        .values()
        .any(|r| r.id != own_id && r.name == name && r.member_email == member_email)
}

#[async_trait]
impl ResourceRepository for InMemoryResourceRepository {
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Resource>> {
        Ok(self.resources.read().await.get(id).cloned())
    }

    async fn find_by_name_and_member_email(
        &self,
        name: &str,
        member_email: &str,
    ) -> StorageResult<Option<Resource>> {
        let resources = self.resources.read().await;
        Ok(resources
            .values()
            .find(|r| r.name == name && r.member_email == member_email)
            .cloned())
    }

    async fn find_all(&self) -> StorageResult<Vec<Resource>> {
        Ok(self.resources.read().await.values().cloned().collect())
    }

    async fn find_matching(&self, filters: &ResourceQueryFilters) -> StorageResult<Vec<Resource>> {
        let resources = self.resources.read().await;
        Ok(resources
            .values()
            .filter(|r| filters.matches(r))
            .cloned()
            .collect())
    }

    async fn insert_if_absent(&self, resource: &Resource) -> StorageResult<bool> {
        let mut resources = self.resources.write().await;
        if claimed_by_other(&resources, &resource.name, &resource.member_email, &resource.id) {
            return Ok(false);
        }

        resources.insert(resource.id.clone(), resource.clone());
        debug!(resource_id = %resource.id, "Resource inserted");
        Ok(true)
    }

    async fn update_attributes(
        &self,
        id: &str,
        patch: ResourcePatch,
        scores: Option<ScoreBundle>,
    ) -> StorageResult<AttributeWrite> {
        let mut resources = self.resources.write().await;
        if claimed_by_other(&resources, &patch.name, &patch.member_email, id) {
            return Ok(AttributeWrite::Claimed);
        }
        let Some(resource) = resources.get_mut(id) else {
            return Ok(AttributeWrite::NotFound);
        };

        if let Err(mismatch) = resource.apply_patch(patch) {
            return Ok(AttributeWrite::VariantMismatch(mismatch));
        }
        if let Some(scores) = scores {
            resource.apply_scores(&scores);
        }

        debug!(resource_id = %id, "Resource attributes updated");
        Ok(AttributeWrite::Applied(resource.clone()))
    }

    async fn update_status(
        &self,
        id: &str,
        status: ResourceStatus,
        task: TaskChange,
    ) -> StorageResult<Option<StatusWrite>> {
        let mut resources = self.resources.write().await;
        let Some(resource) = resources.get_mut(id) else {
            return Ok(None);
        };

        let changed = resource.apply_status(status, &task);
        debug!(resource_id = %id, status = %status, changed, "Resource status written");
        Ok(Some(StatusWrite {
            resource: resource.clone(),
            changed,
        }))
    }
}
