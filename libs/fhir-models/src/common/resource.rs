//! Common behaviour for persistable FHIR resources

use super::error::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// A FHIR resource that can be stored as a JSON document.
///
/// Implementors serialize to their FHIR JSON representation. The repository
/// layer relies on `id()`/`set_id()` to keep the document's `id` element in
/// line with the key it is stored under.
pub trait FhirResource: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The FHIR resource type (e.g., "MedicationRequest")
    const RESOURCE_TYPE: &'static str;

    /// Logical id, if assigned
    fn id(&self) -> Option<&str>;

    /// Assign the logical id
    fn set_id(&mut self, id: String);

    /// Serialize into the stored document form.
    fn to_document(&self) -> Result<Value> {
        let value = serde_json::to_value(self)?;
        if !value.is_object() {
            return Err(Error::InvalidResource(format!(
                "{} did not serialize to a JSON object",
                Self::RESOURCE_TYPE
            )));
        }
        Ok(value)
    }

    /// Deserialize from a stored document, checking `resourceType`.
    fn from_document(document: Value) -> Result<Self> {
        match document.get("resourceType").and_then(|v| v.as_str()) {
            Some(rt) if rt != Self::RESOURCE_TYPE => {
                return Err(Error::ResourceTypeMismatch {
                    expected: Self::RESOURCE_TYPE.to_string(),
                    actual: rt.to_string(),
                })
            }
            _ => {}
        }
        Ok(serde_json::from_value(document)?)
    }
}
