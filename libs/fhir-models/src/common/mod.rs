//! Version-agnostic FHIR models
//!
//! Types that work across FHIR R4, R4B, and R5

pub mod complex;
pub mod error;
pub mod medication_request;
pub mod resource;

// Re-export commonly used types
pub use complex::*;
pub use error::{Error, Result};
pub use medication_request::*;
pub use resource::FhirResource;
