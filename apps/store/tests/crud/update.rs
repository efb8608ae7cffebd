//! update(id, resource) - upsert keyed on the domain id
//!
//! Tests cover:
//! - Insert when absent, replace when present
//! - Storage key survives replacement
//! - Id argument vs. the resource's own id
//! - Storage failures surface unchanged

use crate::support::{
    legacy_document, memory_repo, minimal_request, request_for, FailingDatabase,
};
use medreq_models::MedicationRequestStatus;
use medreq_store::{
    db::{Collection, DocumentDatabase, Filter, MedicationRequestRepository},
    models::ResourceOperation,
    Error,
};
use tokio_test::assert_err;

#[tokio::test]
async fn update_inserts_missing_resource() -> anyhow::Result<()> {
    let (_db, repo) = memory_repo();
    let request = request_for("Patient/p1", MedicationRequestStatus::Draft);

    let outcome = repo.update("new", request.clone()).await?;
    assert_eq!(outcome.id.as_deref(), Some("new"));
    assert_eq!(outcome.operation, ResourceOperation::Created);
    assert_eq!(outcome.operation.status_code(), 201);

    let stored = repo.search_by_id("new").await?.expect("upserted resource");
    assert_eq!(stored, request.with_id("new"));

    Ok(())
}

#[tokio::test]
async fn update_replaces_existing_resource() -> anyhow::Result<()> {
    let (_db, repo) = memory_repo();
    repo.create("mr-1", minimal_request()).await?;

    let replacement = request_for("Patient/example", MedicationRequestStatus::Stopped);
    let outcome = repo.update("mr-1", replacement).await?;
    assert_eq!(outcome.id.as_deref(), Some("mr-1"));
    assert_eq!(outcome.operation, ResourceOperation::Updated);

    let stored = repo.search_by_id("mr-1").await?.expect("resource");
    assert_eq!(stored.status, MedicationRequestStatus::Stopped);
    assert_eq!(repo.count().await?, 1);

    Ok(())
}

#[tokio::test]
async fn update_keeps_storage_key_of_existing_document() -> anyhow::Result<()> {
    let (db, repo) = memory_repo();
    let collection = db.collection(repo.collection_name());
    collection.insert(legacy_document("legacy-key", "mr-1")).await?;

    let stopped = request_for("Patient/example", MedicationRequestStatus::Stopped);
    let outcome = repo.update("mr-1", stopped).await?;
    assert_eq!(outcome.operation, ResourceOperation::Updated);
    assert_eq!(outcome.id.as_deref(), Some("mr-1"));

    let stored = collection
        .find_one(&Filter::by_id("mr-1"))
        .await?
        .expect("stored document");
    assert_eq!(stored.storage_id, "legacy-key");
    assert_eq!(stored.document["status"], "stopped");
    assert_eq!(collection.count().await?, 1);

    Ok(())
}

#[tokio::test]
async fn update_rejects_mismatched_resource_id() {
    let (_db, repo) = memory_repo();

    let err = assert_err!(repo.update("mr-1", minimal_request().with_id("mr-2")).await);
    assert!(matches!(err, Error::InvalidResource(_)), "got {err:?}");
}

#[tokio::test]
async fn update_propagates_driver_failure() {
    let repo = MedicationRequestRepository::new(FailingDatabase::new("timeout"));

    let err = assert_err!(repo.update("mr-1", minimal_request()).await);
    assert!(matches!(err, Error::Storage(ref m) if m == "timeout"), "got {err:?}");
}
