//! count()

use crate::support::{memory_repo, minimal_request, FailingDatabase};
use medreq_store::db::MedicationRequestRepository;
use tokio_test::assert_err;

#[tokio::test]
async fn count_follows_writes() -> anyhow::Result<()> {
    let (_db, repo) = memory_repo();
    assert_eq!(repo.count().await?, 0);

    repo.create("a", minimal_request()).await?;
    repo.create("b", minimal_request()).await?;
    assert_eq!(repo.count().await?, 2);

    // replace does not add, upsert of a new id does
    repo.update("a", minimal_request()).await?;
    assert_eq!(repo.count().await?, 2);
    repo.update("c", minimal_request()).await?;
    assert_eq!(repo.count().await?, 3);

    repo.remove("b").await?;
    repo.remove("b").await?;
    assert_eq!(repo.count().await?, 2);

    Ok(())
}

#[tokio::test]
async fn count_is_scoped_to_collection() -> anyhow::Result<()> {
    let (db, repo) = memory_repo();
    let archive = MedicationRequestRepository::with_collection(db, "MedicationRequestArchive");

    repo.create("a", minimal_request()).await?;
    assert_eq!(archive.count().await?, 0);

    archive.create("a", minimal_request()).await?;
    assert_eq!(archive.count().await?, 1);
    assert_eq!(repo.count().await?, 1);

    Ok(())
}

#[tokio::test]
async fn count_propagates_driver_failure() {
    let repo = MedicationRequestRepository::new(FailingDatabase::new("pool closed"));

    let err = assert_err!(repo.count().await);
    assert!(err.is_storage());
}
