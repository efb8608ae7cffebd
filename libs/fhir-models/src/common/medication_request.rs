//! FHIR MedicationRequest model
//!
//! Version-agnostic model covering the elements shared by R4, R4B and R5.
//! Dosage instructions stay untyped (`Value`); their structure differs enough
//! between versions that the store treats them as opaque.

use super::complex::{Annotation, CodeableConcept, Identifier, Meta, Reference};
use super::resource::FhirResource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// FHIR MedicationRequest resource
///
/// An order or request for both supply of the medication and the instructions
/// for administration of the medication to a patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRequest {
    /// Resource type - always "MedicationRequest"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    /// Logical id of this artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    /// External ids for this request
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    pub status: MedicationRequestStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<CodeableConcept>,

    pub intent: MedicationRequestIntent,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<RequestPriority>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_not_perform: Option<bool>,

    /// Medication to be taken (coded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication_codeable_concept: Option<CodeableConcept>,

    /// Medication to be taken (reference to a Medication resource)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication_reference: Option<Reference>,

    /// Who or group the medication request is for
    pub subject: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,

    /// When the request was initially authored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authored_on: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<Reference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reason_code: Vec<CodeableConcept>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub note: Vec<Annotation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dosage_instruction: Vec<Value>,

    /// Additional content beyond core fields (extensions, version-specific fields)
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "MedicationRequest".to_string()
}

impl MedicationRequest {
    /// Create a minimal request for a subject.
    pub fn new(
        status: MedicationRequestStatus,
        intent: MedicationRequestIntent,
        subject: Reference,
    ) -> Self {
        Self {
            resource_type: default_resource_type(),
            id: None,
            meta: None,
            identifier: Vec::new(),
            status,
            status_reason: None,
            intent,
            category: Vec::new(),
            priority: None,
            do_not_perform: None,
            medication_codeable_concept: None,
            medication_reference: None,
            subject,
            encounter: None,
            authored_on: None,
            requester: None,
            reason_code: Vec::new(),
            note: Vec::new(),
            dosage_instruction: Vec::new(),
            extensions: HashMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_medication(mut self, medication: CodeableConcept) -> Self {
        self.medication_codeable_concept = Some(medication);
        self
    }

    /// Whether the request is still actionable
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            MedicationRequestStatus::Active | MedicationRequestStatus::OnHold
        )
    }
}

impl FhirResource for MedicationRequest {
    const RESOURCE_TYPE: &'static str = "MedicationRequest";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

/// MedicationRequest.status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MedicationRequestStatus {
    Active,
    OnHold,
    Cancelled,
    Completed,
    EnteredInError,
    Stopped,
    Draft,
    Unknown,
}

impl MedicationRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OnHold => "on-hold",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
            Self::EnteredInError => "entered-in-error",
            Self::Stopped => "stopped",
            Self::Draft => "draft",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MedicationRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// MedicationRequest.intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MedicationRequestIntent {
    Proposal,
    Plan,
    Order,
    OriginalOrder,
    ReflexOrder,
    FillerOrder,
    InstanceOrder,
    #[serde(rename = "option")]
    IntentOption,
}

/// Request priority (shared by all request resources)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestPriority {
    Routine,
    Urgent,
    Asap,
    Stat,
}
