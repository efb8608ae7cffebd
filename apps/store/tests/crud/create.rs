//! create(id, resource)
//!
//! Tests cover:
//! - Returned id and round-trip through search_by_id
//! - Duplicate ids
//! - Id argument vs. the resource's own id
//! - Storage failures surface unchanged

use crate::support::{memory_repo, minimal_request, with_rxnorm, FailingDatabase};
use medreq_store::{db::MedicationRequestRepository, Error};
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn create_returns_id_and_round_trips() -> anyhow::Result<()> {
    let (_db, repo) = memory_repo();
    let request = with_rxnorm(minimal_request(), "582620");

    let id = repo.create("mr-1", request.clone()).await?;
    assert_eq!(id, "mr-1");

    let stored = repo.search_by_id("mr-1").await?.expect("created resource");
    assert_eq!(stored, request.with_id("mr-1"));

    Ok(())
}

#[tokio::test]
async fn create_accepts_matching_resource_id() -> anyhow::Result<()> {
    let (_db, repo) = memory_repo();
    let request = minimal_request().with_id("mr-2");

    assert_eq!(repo.create("mr-2", request).await?, "mr-2");
    Ok(())
}

#[tokio::test]
async fn create_rejects_mismatched_resource_id() {
    let (_db, repo) = memory_repo();
    let request = minimal_request().with_id("other");

    let err = assert_err!(repo.create("mr-3", request).await);
    assert!(matches!(err, Error::InvalidResource(_)), "got {err:?}");
    assert_eq!(assert_ok!(repo.count().await), 0);
}

#[tokio::test]
async fn create_rejects_empty_id() {
    let (_db, repo) = memory_repo();

    let err = assert_err!(repo.create("", minimal_request()).await);
    assert!(matches!(err, Error::InvalidResource(_)), "got {err:?}");
}

#[tokio::test]
async fn duplicate_create_is_a_storage_error() -> anyhow::Result<()> {
    let (_db, repo) = memory_repo();
    repo.create("dup", minimal_request()).await?;

    let err = assert_err!(repo.create("dup", minimal_request()).await);
    assert!(matches!(err, Error::DuplicateKey { .. }), "got {err:?}");
    assert!(err.is_storage());
    assert_eq!(err.status_code(), 409);
    assert_eq!(repo.count().await?, 1);

    Ok(())
}

#[tokio::test]
async fn create_propagates_driver_failure() {
    let repo = MedicationRequestRepository::new(FailingDatabase::new("disk full"));

    let err = assert_err!(repo.create("mr-1", minimal_request()).await);
    assert!(matches!(err, Error::Storage(ref m) if m == "disk full"), "got {err:?}");
}
