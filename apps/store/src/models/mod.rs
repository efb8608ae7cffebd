//! Result models for repository operations

pub mod fhir;

pub use fhir::{ResourceOperation, UpdateOutcome};
