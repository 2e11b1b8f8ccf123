// Copyright (c) 2025 - Cowboy AI, Inc.
//! MongoDB resource store
//!
//! Resources are stored as plain documents in the `resource` collection,
//! keyed by their own `id` field rather than `_id`. Equality filters and the
//! kWh ceiling are pushed down to the server; the time window is evaluated
//! in-process on the narrowed result.
//!
//! `(name, memberEmail)` carries a unique index, so a second insert or a
//! rename onto a claimed pair fails with a duplicate-key error. Updates are
//! `$set` of the fields the writer owns: attribute writes never name
//! `status` or `currentTaskId`, and status writes name nothing else.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use tracing::{debug, info};

use super::{AttributeWrite, ResourceRepository, StatusWrite, RESOURCE_COLLECTION};
use crate::domain::{
    Resource, ResourcePatch, ResourceQueryFilters, ResourceStatus, ScoreBundle, TaskChange,
};
use crate::errors::{StorageError, StorageResult};

const DUPLICATE_KEY: i32 = 11000;

/// Fields only status writes may touch
const STATUS_FIELDS: [&str; 2] = ["status", "currentTaskId"];

/// Fields only score enrichment may touch
const SCORE_FIELDS: [&str; 5] = [
    "singleCoreScore",
    "multicoreScore",
    "openclScore",
    "vulkanScore",
    "cudaScore",
];

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY
    )
}

/// [`ResourceRepository`] over a MongoDB collection
#[derive(Clone)]
pub struct MongoResourceRepository {
    collection: Collection<Document>,
}

impl MongoResourceRepository {
    /// Open the collection and make sure its indexes exist
    pub async fn new(database: &Database) -> StorageResult<Self> {
        let repo = Self {
            collection: database.collection::<Document>(RESOURCE_COLLECTION),
        };
        repo.create_indexes().await?;

        info!(collection = RESOURCE_COLLECTION, "MongoDB resource repository ready");
        Ok(repo)
    }

    /// Connect by URI and open the repository in `database`
    pub async fn connect(uri: &str, database: &str) -> StorageResult<Self> {
        let client = mongodb::Client::with_uri_str(uri).await?;
        Self::new(&client.database(database)).await
    }

    async fn create_indexes(&self) -> StorageResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "id": 1 })
                .options(IndexOptions::builder().name("resource_id".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "name": 1, "memberEmail": 1 })
                .options(
                    IndexOptions::builder()
                        .name("resource_owner".to_string())
                        .unique(true)
                        .build(),
                )
                .build(),
        ];

        self.collection
            .create_indexes(indexes, None)
            .await
            .map_err(|e| StorageError::Backend(format!("Failed to create indexes: {}", e)))?;
        Ok(())
    }

    fn to_document(resource: &Resource) -> StorageResult<Document> {
        bson::to_document(resource).map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    fn from_document(mut document: Document) -> StorageResult<Resource> {
        document.remove("_id");
        bson::from_document(document).map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    async fn find_one(&self, filter: Document) -> StorageResult<Option<Resource>> {
        self.collection
            .find_one(filter, None)
            .await?
            .map(Self::from_document)
            .transpose()
    }

    async fn find_many(&self, filter: Document) -> StorageResult<Vec<Resource>> {
        let documents: Vec<Document> = self.collection.find(filter, None).await?.try_collect().await?;
        documents.into_iter().map(Self::from_document).collect()
    }
}

/// Server-side part of a filter set
fn pushdown_filter(filters: &ResourceQueryFilters) -> Document {
    let mut filter = doc! { "status": filters.effective_status().as_str() };

    let equalities = [
        ("name", filters.name.as_deref()),
        ("type", filters.resource_type.as_ref().map(|t| t.as_str())),
        ("greenEnergyType", filters.green_energy_type.as_deref()),
        ("country", filters.country.as_deref()),
        ("region", filters.region.as_deref()),
        ("city", filters.city.as_deref()),
        ("memberEmail", filters.member_email.as_deref()),
    ];
    for (field, value) in equalities {
        if let Some(value) = value {
            filter.insert(field, value);
        }
    }
    if let Some(ceiling) = filters.kwh {
        filter.insert("kWh", doc! { "$lte": ceiling });
    }

    filter
}

#[async_trait]
impl ResourceRepository for MongoResourceRepository {
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Resource>> {
        self.find_one(doc! { "id": id }).await
    }

    async fn find_by_name_and_member_email(
        &self,
        name: &str,
        member_email: &str,
    ) -> StorageResult<Option<Resource>> {
        self.find_one(doc! { "name": name, "memberEmail": member_email })
            .await
    }

    async fn find_all(&self) -> StorageResult<Vec<Resource>> {
        self.find_many(doc! {}).await
    }

    async fn find_matching(&self, filters: &ResourceQueryFilters) -> StorageResult<Vec<Resource>> {
        let candidates = self.find_many(pushdown_filter(filters)).await?;
        Ok(candidates
            .into_iter()
            .filter(|r| filters.matches(r))
            .collect())
    }

    async fn insert_if_absent(&self, resource: &Resource) -> StorageResult<bool> {
        let document = Self::to_document(resource)?;
        match self.collection.insert_one(document, None).await {
            Ok(_) => {
                debug!(resource_id = %resource.id, "Resource document inserted");
                Ok(true)
            }
            Err(e) if is_duplicate_key(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_attributes(
        &self,
        id: &str,
        patch: ResourcePatch,
        scores: Option<ScoreBundle>,
    ) -> StorageResult<AttributeWrite> {
        let Some(mut resource) = self.find_by_id(id).await? else {
            return Ok(AttributeWrite::NotFound);
        };
        let resource_type = resource.resource_type();
        if let Err(mismatch) = resource.apply_patch(patch) {
            return Ok(AttributeWrite::VariantMismatch(mismatch));
        }
        if let Some(scores) = &scores {
            resource.apply_scores(scores);
        }

        let fields = attribute_fields(&resource, scores.is_some())?;
        let filter = doc! { "id": id, "type": resource_type.as_str() };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        match self
            .collection
            .find_one_and_update(filter, doc! { "$set": fields }, options)
            .await
        {
            Ok(Some(document)) => {
                debug!(resource_id = %id, "Resource attributes updated");
                Ok(AttributeWrite::Applied(Self::from_document(document)?))
            }
            Ok(None) => Ok(AttributeWrite::NotFound),
            Err(e) if is_duplicate_key(&e) => Ok(AttributeWrite::Claimed),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_status(
        &self,
        id: &str,
        status: ResourceStatus,
        task: TaskChange,
    ) -> StorageResult<Option<StatusWrite>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::Before)
            .build();
        let before = self
            .collection
            .find_one_and_update(doc! { "id": id }, doc! { "$set": status_fields(status, &task) }, options)
            .await?;

        let Some(before) = before else {
            return Ok(None);
        };
        let mut resource = Self::from_document(before)?;
        let changed = resource.apply_status(status, &task);

        debug!(resource_id = %id, status = %status, changed, "Resource status written");
        Ok(Some(StatusWrite { resource, changed }))
    }
}

/// `$set` body for a client attribute write
fn attribute_fields(resource: &Resource, with_scores: bool) -> StorageResult<Document> {
    let mut fields = MongoResourceRepository::to_document(resource)?;
    for key in ["id", "type"].iter().chain(STATUS_FIELDS.iter()) {
        fields.remove(*key);
    }
    if !with_scores {
        for key in SCORE_FIELDS {
            fields.remove(key);
        }
    }
    Ok(fields)
}

/// `$set` body for a status write
fn status_fields(status: ResourceStatus, task: &TaskChange) -> Document {
    let mut fields = doc! { "status": status.as_str() };
    match task {
        TaskChange::Keep => {}
        TaskChange::Assign(task_id) => {
            fields.insert("currentTaskId", task_id.as_str());
        }
        TaskChange::Clear => {
            fields.insert("currentTaskId", Bson::Null);
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ResourceStatus, ResourceType};

    #[test]
    fn test_pushdown_defaults_to_available() {
        let filter = pushdown_filter(&ResourceQueryFilters::default());
        assert_eq!(filter, doc! { "status": "AVAILABLE" });
    }

    #[test]
    fn test_pushdown_includes_present_fields() {
        let filters = ResourceQueryFilters {
            resource_type: Some(ResourceType::Soc),
            city: Some("Lecce".to_string()),
            kwh: Some(0.5),
            status: Some(ResourceStatus::Busy),
            ..ResourceQueryFilters::default()
        };

        let filter = pushdown_filter(&filters);
        assert_eq!(filter.get_str("status").unwrap(), "BUSY");
        assert_eq!(filter.get_str("type").unwrap(), "soc");
        assert_eq!(filter.get_str("city").unwrap(), "Lecce");
        assert_eq!(
            filter.get_document("kWh").unwrap(),
            &doc! { "$lte": 0.5 }
        );
        assert!(filter.get("name").is_none());
    }

    #[test]
    fn test_status_write_names_only_status_fields() {
        assert_eq!(
            status_fields(ResourceStatus::Busy, &TaskChange::Keep),
            doc! { "status": "BUSY" }
        );
        assert_eq!(
            status_fields(ResourceStatus::Busy, &TaskChange::Assign("t-1".to_string())),
            doc! { "status": "BUSY", "currentTaskId": "t-1" }
        );
        assert_eq!(
            status_fields(ResourceStatus::Available, &TaskChange::Clear),
            doc! { "status": "AVAILABLE", "currentTaskId": Bson::Null }
        );
    }

    #[test]
    fn test_attribute_write_skips_status_and_identity() {
        use crate::domain::{CommonPatch, CpuPatch, HardwarePatch};

        let mut resource = Resource::from_patch(ResourcePatch {
            name: "rig".to_string(),
            member_email: "ada@example.org".to_string(),
            common: CommonPatch::default(),
            hardware: HardwarePatch::Cpu(CpuPatch::default()),
        });
        resource.apply_status(ResourceStatus::Busy, &TaskChange::Assign("t-1".to_string()));

        let unscored = attribute_fields(&resource, false).unwrap();
        for key in ["id", "type", "status", "currentTaskId", "singleCoreScore"] {
            assert!(!unscored.contains_key(key), "{} should not be written", key);
        }
        assert_eq!(unscored.get_str("name").unwrap(), "rig");

        let scored = attribute_fields(&resource, true).unwrap();
        assert!(scored.contains_key("singleCoreScore"));
        assert!(!scored.contains_key("status"));
    }
}
