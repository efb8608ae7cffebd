//! search(params)
//!
//! Tests cover:
//! - Token, reference and coding parameters
//! - AND across parameters
//! - Unsupported parameters and modifiers
//! - Storage failures surface unchanged

use crate::support::{memory_repo, request_for, with_rxnorm, FailingDatabase, RXNORM};
use medreq_models::{MedicationRequest, MedicationRequestStatus};
use medreq_store::{
    db::{MedicationRequestRepository, MemoryDatabase},
    Error,
};
use tokio_test::assert_err;

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn ids(found: &[MedicationRequest]) -> Vec<&str> {
    found.iter().filter_map(|r| r.id.as_deref()).collect()
}

async fn seeded() -> anyhow::Result<MedicationRequestRepository<MemoryDatabase>> {
    let (_db, repo) = memory_repo();
    repo.create(
        "a",
        with_rxnorm(request_for("Patient/p1", MedicationRequestStatus::Active), "582620"),
    )
    .await?;
    repo.create(
        "b",
        with_rxnorm(request_for("Patient/p1", MedicationRequestStatus::Stopped), "197361"),
    )
    .await?;
    repo.create(
        "c",
        with_rxnorm(request_for("Patient/p2", MedicationRequestStatus::Active), "197361"),
    )
    .await?;
    Ok(repo)
}

#[tokio::test]
async fn search_without_parameters_returns_everything() -> anyhow::Result<()> {
    let repo = seeded().await?;

    let found = repo.search(&[]).await?;
    assert_eq!(ids(&found), vec!["a", "b", "c"]);
    Ok(())
}

#[tokio::test]
async fn search_by_status() -> anyhow::Result<()> {
    let repo = seeded().await?;

    let found = repo.search(&params(&[("status", "active")])).await?;
    assert_eq!(ids(&found), vec!["a", "c"]);
    Ok(())
}

#[tokio::test]
async fn search_by_patient_accepts_bare_id() -> anyhow::Result<()> {
    let repo = seeded().await?;

    let found = repo.search(&params(&[("patient", "p1")])).await?;
    assert_eq!(ids(&found), vec!["a", "b"]);

    let found = repo.search(&params(&[("subject", "Patient/p2")])).await?;
    assert_eq!(ids(&found), vec!["c"]);
    Ok(())
}

#[tokio::test]
async fn search_by_code_with_and_without_system() -> anyhow::Result<()> {
    let repo = seeded().await?;

    let with_system = format!("{RXNORM}|197361");
    let found = repo
        .search(&params(&[("code", with_system.as_str())]))
        .await?;
    assert_eq!(ids(&found), vec!["b", "c"]);

    let found = repo.search(&params(&[("code", "582620")])).await?;
    assert_eq!(ids(&found), vec!["a"]);

    let found = repo
        .search(&params(&[("code", "http://snomed.info/sct|582620")]))
        .await?;
    assert!(found.is_empty());
    Ok(())
}

#[tokio::test]
async fn search_parameters_are_combined() -> anyhow::Result<()> {
    let repo = seeded().await?;

    let found = repo
        .search(&params(&[("status", "active"), ("code", "197361")]))
        .await?;
    assert_eq!(ids(&found), vec!["c"]);
    Ok(())
}

#[tokio::test]
async fn search_rejects_unsupported_parameters() -> anyhow::Result<()> {
    let repo = seeded().await?;

    for (name, value) in [
        ("dose-quantity", "5"),
        ("status:missing", "true"),
        ("_sort", "authoredon"),
        ("status", "active,stopped"),
    ] {
        let err = assert_err!(repo.search(&params(&[(name, value)])).await);
        assert!(matches!(err, Error::NotSupported(_)), "{name}: got {err:?}");
        assert_eq!(err.status_code(), 501);
    }
    Ok(())
}

#[tokio::test]
async fn search_propagates_driver_failure() {
    let repo = MedicationRequestRepository::new(FailingDatabase::new("no route to host"));

    let err = assert_err!(repo.search(&params(&[("status", "active")])).await);
    assert!(err.is_storage());
}
