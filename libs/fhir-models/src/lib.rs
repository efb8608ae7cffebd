//! FHIR data models for the MedicationRequest store
//!
//! This crate provides strongly-typed Rust structures for the resources the
//! store persists, plus the [`FhirResource`] trait the repository layer is
//! generic over.
//!
//! # Serialized form
//!
//! Models serialize to the FHIR JSON representation: camelCase element names,
//! absent optional elements omitted, `resourceType` always present. Elements
//! without a typed field are captured in `extensions` and written back as-is,
//! so a document read from storage deserializes to an equal value.
//!
//! # Example
//!
//! ```rust
//! use medreq_models::common::{FhirResource, MedicationRequest, MedicationRequestStatus};
//! use serde_json::json;
//!
//! let json = json!({
//!     "resourceType": "MedicationRequest",
//!     "id": "mr-1",
//!     "status": "active",
//!     "intent": "order",
//!     "subject": { "reference": "Patient/example" }
//! });
//!
//! let mr: MedicationRequest = serde_json::from_value(json).unwrap();
//! assert_eq!(mr.id(), Some("mr-1"));
//! assert_eq!(mr.status, MedicationRequestStatus::Active);
//! ```

pub mod common;

// Re-export commonly used types
pub use common::*;
