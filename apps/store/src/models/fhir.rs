//! Outcomes of write operations

use serde::Serialize;

/// Type of write performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceOperation {
    /// Resource was created (HTTP 201)
    Created,

    /// Resource was replaced (HTTP 200)
    Updated,
}

impl ResourceOperation {
    /// Get HTTP status code for this operation
    pub fn status_code(&self) -> u16 {
        match self {
            ResourceOperation::Created => 201,
            ResourceOperation::Updated => 200,
        }
    }
}

/// Result of an upsert
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    /// Domain id of the written document; absent if the backend returned none
    pub id: Option<String>,

    pub operation: ResourceOperation,
}
