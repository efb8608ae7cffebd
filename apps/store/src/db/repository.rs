//! Resource repository - CRUD access for one resource type over a document collection

use medreq_models::{FhirResource, MedicationRequest};
use std::marker::PhantomData;

use super::filter::Filter;
use super::search::{build_filter, SearchableResource};
use super::traits::{Collection, DocumentDatabase, ReplaceOptions, StoredDocument};
use crate::{
    models::{ResourceOperation, UpdateOutcome},
    Error, Result,
};

/// Repository over the MedicationRequest collection
pub type MedicationRequestRepository<D> = ResourceRepository<MedicationRequest, D>;

/// Count, search, read, create, upsert and delete for resources of type `R`
///
/// Each operation opens a collection handle from the injected database and
/// performs exactly one collection call. Failures are logged here and returned
/// unchanged, apart from `remove`, which reports any storage failure as
/// `Error::Conflict`.
pub struct ResourceRepository<R, D> {
    db: D,
    collection: String,
    _resource: PhantomData<fn() -> R>,
}

impl<R, D: Clone> Clone for ResourceRepository<R, D> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            collection: self.collection.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R, D> ResourceRepository<R, D>
where
    R: FhirResource,
    D: DocumentDatabase,
{
    /// Repository storing `R` in the collection named after its resource type
    pub fn new(db: D) -> Self {
        Self::with_collection(db, R::RESOURCE_TYPE)
    }

    pub fn with_collection(db: D, collection: impl Into<String>) -> Self {
        Self {
            db,
            collection: collection.into(),
            _resource: PhantomData,
        }
    }

    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    fn collection(&self) -> D::Collection {
        self.db.collection(&self.collection)
    }

    /// Number of stored resources
    pub async fn count(&self) -> Result<u64> {
        tracing::info!(resource_type = R::RESOURCE_TYPE, "count");

        self.collection().count().await.inspect_err(|e| {
            tracing::error!(resource_type = R::RESOURCE_TYPE, error = %e, "count failed");
        })
    }

    /// Resources matching every search parameter, in storage-key order
    ///
    /// # Errors
    /// * `NotSupported` - parameter or modifier the resource does not define
    /// * `InvalidSearch` - empty parameter value
    pub async fn search(&self, params: &[(String, String)]) -> Result<Vec<R>>
    where
        R: SearchableResource,
    {
        tracing::info!(
            resource_type = R::RESOURCE_TYPE,
            params = params.len(),
            "search"
        );

        let filter = build_filter::<R>(params).inspect_err(|e| {
            tracing::warn!(resource_type = R::RESOURCE_TYPE, error = %e, "search rejected");
        })?;

        let documents = self.collection().find(&filter).await.inspect_err(|e| {
            tracing::error!(resource_type = R::RESOURCE_TYPE, error = %e, "search failed");
        })?;

        documents
            .into_iter()
            .map(decode::<R>)
            .collect()
    }

    /// The resource whose `id` equals `id`, or `None` if there is none
    pub async fn search_by_id(&self, id: &str) -> Result<Option<R>> {
        tracing::info!(resource_type = R::RESOURCE_TYPE, id, "searchById");

        let found = self
            .collection()
            .find_one(&Filter::by_id(id))
            .await
            .inspect_err(|e| {
                tracing::error!(
                    resource_type = R::RESOURCE_TYPE,
                    id,
                    error = %e,
                    "searchById failed"
                );
            })?;

        found.map(decode::<R>).transpose()
    }

    /// Insert `resource` under `id`, which becomes both its storage key and
    /// its domain id. Returns the id of the inserted document.
    ///
    /// # Errors
    /// * `DuplicateKey` - a resource with this id already exists
    /// * `InvalidResource` - the resource carries a different id
    pub async fn create(&self, id: &str, resource: R) -> Result<String> {
        tracing::info!(resource_type = R::RESOURCE_TYPE, id, "create");

        let document = prepare(id, resource).inspect_err(|e| {
            tracing::warn!(resource_type = R::RESOURCE_TYPE, id, error = %e, "create rejected");
        })?;
        let result = self.collection().insert(document).await.inspect_err(|e| {
            tracing::error!(resource_type = R::RESOURCE_TYPE, id, error = %e, "create failed");
        })?;

        result
            .inserted
            .first()
            .and_then(|doc| doc.resource_id())
            .map(str::to_string)
            .ok_or_else(|| {
                tracing::error!(
                    resource_type = R::RESOURCE_TYPE,
                    id,
                    "insert reported no document"
                );
                Error::Storage(format!("insert into {} reported no document", self.collection))
            })
    }

    /// Replace the resource with domain id `id`, inserting it if absent
    ///
    /// An existing document keeps its storage key; only its content changes.
    /// No version check is made.
    pub async fn update(&self, id: &str, resource: R) -> Result<UpdateOutcome> {
        tracing::info!(resource_type = R::RESOURCE_TYPE, id, "update");

        let document = prepare(id, resource).inspect_err(|e| {
            tracing::warn!(resource_type = R::RESOURCE_TYPE, id, error = %e, "update rejected");
        })?;
        let result = self
            .collection()
            .find_one_and_replace(
                &Filter::by_id(id),
                document,
                ReplaceOptions { upsert: true },
            )
            .await
            .inspect_err(|e| {
                tracing::error!(resource_type = R::RESOURCE_TYPE, id, error = %e, "update failed");
            })?;

        let operation = if result.upserted {
            ResourceOperation::Created
        } else {
            ResourceOperation::Updated
        };

        Ok(UpdateOutcome {
            id: result
                .value
                .as_ref()
                .and_then(|doc| doc.resource_id())
                .map(str::to_string),
            operation,
        })
    }

    /// Delete the resource with domain id `id`
    ///
    /// Deleting an absent resource succeeds. Any storage failure is reported
    /// as `Error::Conflict` (HTTP 409) with the backend's message.
    pub async fn remove(&self, id: &str) -> Result<()> {
        tracing::info!(resource_type = R::RESOURCE_TYPE, id, "remove");

        match self.collection().remove(&Filter::by_id(id)).await {
            Ok(removed) => {
                tracing::debug!(resource_type = R::RESOURCE_TYPE, id, removed, "removed");
                Ok(())
            }
            Err(e) => {
                tracing::error!(resource_type = R::RESOURCE_TYPE, id, error = %e, "remove failed");
                Err(Error::Conflict {
                    message: driver_message(e),
                })
            }
        }
    }
}

/// Check the id invariant and serialize
fn prepare<R: FhirResource>(id: &str, mut resource: R) -> Result<StoredDocument> {
    if id.trim().is_empty() {
        return Err(Error::InvalidResource("id must not be empty".to_string()));
    }

    match resource.id().map(str::to_string) {
        Some(own) if own != id => {
            return Err(Error::InvalidResource(format!(
                "{} id '{own}' does not match '{id}'",
                R::RESOURCE_TYPE
            )))
        }
        Some(_) => {}
        None => resource.set_id(id.to_string()),
    }

    Ok(StoredDocument::new(id, resource.to_document()?))
}

fn decode<R: FhirResource>(stored: StoredDocument) -> Result<R> {
    let storage_id = stored.storage_id;
    R::from_document(stored.document).map_err(|e| {
        tracing::error!(
            resource_type = R::RESOURCE_TYPE,
            storage_id = %storage_id,
            error = %e,
            "stored document does not decode"
        );
        Error::from(e)
    })
}

/// The backend's own message, without our variant prefix
fn driver_message(err: Error) -> String {
    match err {
        Error::Database(e) => e.to_string(),
        Error::Storage(message) => message,
        other => other.to_string(),
    }
}
