//! Database layer - document collections, backends and the resource repository

pub mod filter;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod search;
pub mod traits;

pub use filter::Filter;
pub use memory::{MemoryCollection, MemoryDatabase};
pub use postgres::{PgCollection, PgDatabase};
pub use repository::{MedicationRequestRepository, ResourceRepository};
pub use search::{build_filter, SearchParameter, SearchableResource};
pub use traits::{
    Collection, DocumentDatabase, InsertResult, ReplaceOptions, ReplaceResult, StoredDocument,
};
