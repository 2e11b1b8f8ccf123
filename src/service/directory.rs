// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Directory Service
//!
//! The authoritative store of resource records. Writes follow one order so
//! that nothing is ever partially applied:
//!
//! ```text
//! insert: conflict check → availability → kWh → score → insert if absent → publish
//! update: lookup → variant → availability → kWh → conflict check
//!         → score (rename only) → attribute write → publish
//! ```
//!
//! Every check that can reject the request runs before the first write.
//! The early conflict check only saves a score request; the write itself
//! re-checks `(name, memberEmail)` atomically, so two racing registrations
//! cannot both land. Attribute writes never touch status or task id, and
//! status writes touch nothing else, so a scheduler message applied during
//! a rename's score exchange survives it.
//!
//! A publish failure after a successful write is logged and the operation
//! still succeeds; the scheduler reconciles through full reads.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use super::scoring::{ScoringClient, ScoringError};
use crate::domain::{
    validate_all, AvailabilityError, Resource, ResourcePatch, ResourceQueryFilters,
    ResourceStatus, ResourceType, ScoreBundle, TaskChange,
};
use crate::dto::{ResourceDto, ResourceMessageDto};
use crate::errors::{MessagingError, StorageError};
use crate::messaging::Messenger;
use crate::repository::{AttributeWrite, ResourceRepository};
use crate::subjects::Route;

/// Directory operation result type
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Directory operation errors
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Another resource already has this name for this member
    #[error("Resource '{name}' already exists for {member_email}")]
    Conflict { name: String, member_email: String },

    /// No resource with this id
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Update request without an id
    #[error("Resource id is required for updates")]
    MissingId,

    /// Scores could not be obtained, nothing was written
    #[error("Scoring unavailable: {0}")]
    ScoringUnavailable(#[source] ScoringError),

    /// An availability window breaks the half-hour rule
    #[error("Bad availability format: {0}")]
    BadFormatAvailability(#[from] AvailabilityError),

    /// The update targets a different hardware variant
    #[error("Resource {id} is a {stored} resource, update was for {requested}")]
    VariantMismatch {
        id: String,
        stored: ResourceType,
        requested: ResourceType,
    },

    /// kWh is negative or not a number
    #[error("Energy draw must be a non-negative number of kWh, got {0}")]
    InvalidEnergyDraw(f64),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingError),
}

/// Directory operations behind the HTTP surface
#[async_trait]
pub trait ResourceDirectoryService: Send + Sync {
    /// Create a resource; it starts AVAILABLE with no task
    async fn insert(&self, dto: ResourceDto) -> DirectoryResult<ResourceDto>;

    /// Update client attributes; a rename re-scores under the new name
    async fn update(&self, dto: ResourceDto) -> DirectoryResult<ResourceDto>;

    /// Operator status change; the task id is left untouched
    async fn update_status(&self, id: &str, status: ResourceStatus) -> DirectoryResult<ResourceDto>;

    async fn make_available(&self, id: &str) -> DirectoryResult<ResourceDto> {
        self.update_status(id, ResourceStatus::Available).await
    }

    async fn make_unavailable(&self, id: &str) -> DirectoryResult<ResourceDto> {
        self.update_status(id, ResourceStatus::Unavailable).await
    }

    /// Filtered lookup; AVAILABLE only unless a status is given
    async fn find_resources(&self, filters: &ResourceQueryFilters)
        -> DirectoryResult<Vec<ResourceDto>>;

    /// Every resource, any status
    async fn find_all(&self) -> DirectoryResult<Vec<ResourceDto>>;
}

/// Repository-backed directory with score enrichment and event publishing
#[derive(Clone)]
pub struct ResourceDirectory {
    repository: Arc<dyn ResourceRepository>,
    scoring: ScoringClient,
    messenger: Messenger,
    events: Route,
}

impl ResourceDirectory {
    /// `events` is where new/updated-resource events are published
    pub fn new(
        repository: Arc<dyn ResourceRepository>,
        scoring: ScoringClient,
        messenger: Messenger,
        events: Route,
    ) -> Self {
        Self {
            repository,
            scoring,
            messenger,
            events,
        }
    }

    async fn load(&self, id: &str) -> DirectoryResult<Resource> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(id.to_string()))
    }

    async fn ensure_unclaimed(&self, patch: &ResourcePatch, own_id: Option<&str>) -> DirectoryResult<()> {
        let existing = self
            .repository
            .find_by_name_and_member_email(&patch.name, &patch.member_email)
            .await?;

        match existing {
            Some(existing) if Some(existing.id.as_str()) != own_id => {
                warn!(resource_id = %existing.id, "Rejected duplicate resource");
                Err(Self::conflict(patch))
            }
            _ => Ok(()),
        }
    }

    fn conflict(patch: &ResourcePatch) -> DirectoryError {
        DirectoryError::Conflict {
            name: patch.name.clone(),
            member_email: patch.member_email.clone(),
        }
    }

    fn validate_availability(patch: &ResourcePatch) -> DirectoryResult<()> {
        if let Some(windows) = patch.availability() {
            validate_all(windows).map_err(|e| {
                warn!(name = %patch.name, error = %e, "Rejected availability");
                DirectoryError::from(e)
            })?;
        }
        Ok(())
    }

    fn validate_energy_draw(patch: &ResourcePatch) -> DirectoryResult<()> {
        match patch.common.kwh {
            Some(kwh) if !(kwh.is_finite() && kwh >= 0.0) => {
                warn!(name = %patch.name, kwh, "Rejected energy draw");
                Err(DirectoryError::InvalidEnergyDraw(kwh))
            }
            _ => Ok(()),
        }
    }

    async fn score(&self, name: &str, resource_type: ResourceType) -> DirectoryResult<ScoreBundle> {
        self.scoring
            .score(name, resource_type)
            .await
            .map_err(DirectoryError::ScoringUnavailable)
    }

    /// Publish the resource projection; failures are logged only
    async fn publish(&self, resource: &Resource) {
        let event = ResourceMessageDto::from(resource);
        if let Err(e) = self
            .messenger
            .send(&event, &self.events.routing_key, &self.events.exchange)
            .await
        {
            error!(
                resource_id = %resource.id,
                subject = %self.events,
                error = %e,
                "Failed to publish resource event"
            );
        }
    }
}

#[async_trait]
impl ResourceDirectoryService for ResourceDirectory {
    async fn insert(&self, dto: ResourceDto) -> DirectoryResult<ResourceDto> {
        let patch = ResourcePatch::from(dto);

        self.ensure_unclaimed(&patch, None).await?;
        Self::validate_availability(&patch)?;
        Self::validate_energy_draw(&patch)?;

        let mut resource = Resource::from_patch(patch);
        let scores = self.score(&resource.name, resource.resource_type()).await?;
        resource.apply_scores(&scores);

        if !self.repository.insert_if_absent(&resource).await? {
            warn!(name = %resource.name, "Lost registration race for resource name");
            return Err(DirectoryError::Conflict {
                name: resource.name,
                member_email: resource.member_email,
            });
        }
        self.publish(&resource).await;

        info!(
            resource_id = %resource.id,
            name = %resource.name,
            resource_type = %resource.resource_type(),
            "Resource registered"
        );
        Ok(ResourceDto::from(&resource))
    }

    async fn update(&self, dto: ResourceDto) -> DirectoryResult<ResourceDto> {
        let id = dto.id.clone().ok_or(DirectoryError::MissingId)?;
        let stored = self.load(&id).await?;
        let patch = ResourcePatch::from(dto);

        if patch.resource_type() != stored.resource_type() {
            warn!(resource_id = %id, "Rejected update for another variant");
            return Err(DirectoryError::VariantMismatch {
                id,
                stored: stored.resource_type(),
                requested: patch.resource_type(),
            });
        }

        Self::validate_availability(&patch)?;
        Self::validate_energy_draw(&patch)?;

        if patch.name != stored.name || patch.member_email != stored.member_email {
            self.ensure_unclaimed(&patch, Some(&id)).await?;
        }

        let renamed = patch.name != stored.name;
        let scores = if renamed {
            Some(self.score(&patch.name, stored.resource_type()).await?)
        } else {
            None
        };

        let conflict = Self::conflict(&patch);
        let updated = match self.repository.update_attributes(&id, patch, scores).await? {
            AttributeWrite::Applied(resource) => resource,
            AttributeWrite::Claimed => {
                warn!(resource_id = %id, "Lost rename race for resource name");
                return Err(conflict);
            }
            AttributeWrite::NotFound => return Err(DirectoryError::NotFound(id)),
            AttributeWrite::VariantMismatch(mismatch) => {
                return Err(DirectoryError::VariantMismatch {
                    id,
                    stored: mismatch.stored,
                    requested: mismatch.requested,
                })
            }
        };
        self.publish(&updated).await;

        info!(resource_id = %id, renamed, "Resource updated");
        Ok(ResourceDto::from(&updated))
    }

    async fn update_status(&self, id: &str, status: ResourceStatus) -> DirectoryResult<ResourceDto> {
        let written = self
            .repository
            .update_status(id, status, TaskChange::Keep)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(id.to_string()))?;
        self.publish(&written.resource).await;

        info!(resource_id = %id, status = %status, "Resource status set");
        Ok(ResourceDto::from(&written.resource))
    }

    async fn find_resources(
        &self,
        filters: &ResourceQueryFilters,
    ) -> DirectoryResult<Vec<ResourceDto>> {
        let resources = self.repository.find_matching(filters).await?;
        Ok(resources.iter().map(ResourceDto::from).collect())
    }

    async fn find_all(&self) -> DirectoryResult<Vec<ResourceDto>> {
        let resources = self.repository.find_all().await?;
        Ok(resources.iter().map(ResourceDto::from).collect())
    }
}
