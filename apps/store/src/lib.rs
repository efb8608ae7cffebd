//! MedicationRequest store
//!
//! Persistence for FHIR MedicationRequest resources in a document collection:
//! - count, search, read by id, create, upsert and delete
//! - PostgreSQL JSONB backend (sqlx) and an in-memory backend
//! - Layered configuration and structured logging for the `medreq-store` binary
//!
//! The database handle is passed in explicitly; nothing here holds global state.
//!
//! ```no_run
//! use medreq_models::{MedicationRequest, MedicationRequestIntent, MedicationRequestStatus, Reference};
//! use medreq_store::db::{MedicationRequestRepository, MemoryDatabase};
//!
//! # async fn demo() -> medreq_store::Result<()> {
//! let repo = MedicationRequestRepository::new(MemoryDatabase::new());
//! let request = MedicationRequest::new(
//!     MedicationRequestStatus::Active,
//!     MedicationRequestIntent::Order,
//!     Reference::to("Patient/example"),
//! );
//!
//! let id = repo.create("mr-1", request).await?;
//! assert!(repo.search_by_id(&id).await?.is_some());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;

pub use config::Config;
pub use db::{MedicationRequestRepository, ResourceRepository};
pub use error::{Error, Result};
