//! FHIR complex datatypes used by the stored resources

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A reference to a code defined by a terminology system
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_selected: Option<bool>,

    /// Element id, `extension` and any other untyped content
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

impl Coding {
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            code: Some(code.into()),
            ..Default::default()
        }
    }
}

/// A concept that may be defined by one or more codes
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

impl CodeableConcept {
    pub fn from_coding(coding: Coding) -> Self {
        Self {
            coding: vec![coding],
            ..Default::default()
        }
    }

    /// True if any coding carries the given system and code.
    pub fn has_code(&self, system: Option<&str>, code: &str) -> bool {
        self.coding.iter().any(|c| {
            c.code.as_deref() == Some(code)
                && system.map_or(true, |s| c.system.as_deref() == Some(s))
        })
    }
}

/// An identifier intended for computation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub identifier_use: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub identifier_type: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// `period`, `assigner` and other untyped content
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// A reference from one resource to another
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Reference {
    /// Literal reference, relative, internal or absolute URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub reference_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

impl Reference {
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            reference: Some(target.into()),
            ..Default::default()
        }
    }
}

/// A text note with author and time
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_string: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_reference: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// Resource metadata
///
/// Only `lastUpdated`, `source` and `profile` are typed; tags, security labels
/// and anything else land in `extensions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profile: Vec<String>,

    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}
