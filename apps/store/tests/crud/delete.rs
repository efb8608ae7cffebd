//! remove(id)
//!
//! Tests cover:
//! - Create / read / delete / read scenario
//! - Delete is idempotent
//! - Storage failures become a 409 conflict with the driver message

use crate::support::{memory_repo, minimal_request, FailingDatabase};
use medreq_store::{db::MedicationRequestRepository, Error};
use tokio_test::assert_err;

#[tokio::test]
async fn create_read_delete_read() -> anyhow::Result<()> {
    let (_db, repo) = memory_repo();
    let request = minimal_request();

    assert_eq!(repo.create("mr-1", request.clone()).await?, "mr-1");

    let stored = repo.search_by_id("mr-1").await?.expect("created resource");
    assert_eq!(stored, request.with_id("mr-1"));

    repo.remove("mr-1").await?;
    assert!(repo.search_by_id("mr-1").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn delete_missing_resource_succeeds() -> anyhow::Result<()> {
    let (_db, repo) = memory_repo();

    repo.remove("never-existed").await?;
    repo.remove("never-existed").await?;
    Ok(())
}

#[tokio::test]
async fn delete_only_touches_matching_resource() -> anyhow::Result<()> {
    let (_db, repo) = memory_repo();
    repo.create("keep", minimal_request()).await?;
    repo.create("drop", minimal_request()).await?;

    repo.remove("drop").await?;
    assert!(repo.search_by_id("keep").await?.is_some());
    assert_eq!(repo.count().await?, 1);

    Ok(())
}

#[tokio::test]
async fn delete_failure_is_conflict_with_driver_message() {
    let repo = MedicationRequestRepository::new(FailingDatabase::new(
        "update or delete violates foreign key constraint",
    ));

    let err = assert_err!(repo.remove("mr-1").await);
    match &err {
        Error::Conflict { message } => {
            assert_eq!(message, "update or delete violates foreign key constraint")
        }
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(err.status_code(), 409);
    assert_eq!(err.operation_outcome()["issue"][0]["code"], "conflict");
}
