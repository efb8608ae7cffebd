//! Search parameter definitions and filter construction
//!
//! Each supported parameter maps to a path in the resource JSON and a value
//! kind. `build_filter` turns `(name, value)` pairs into one containment
//! filter; all parameters must match.

use medreq_models::{FhirResource, MedicationRequest};
use serde_json::{json, Map, Value as JsonValue};

use super::filter::Filter;
use crate::{Error, Result};

/// One step in a JSON path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment {
    /// Object member
    Field(&'static str),
    /// Any element of an array
    Each,
}

/// How a parameter value is turned into the leaf of the pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Exact string match on the element
    Token,
    /// `Type/id` reference; a bare id gets `default_type` prepended when set
    Reference { default_type: Option<&'static str> },
    /// `[system|]code` against a Coding
    Coding,
    /// `[system|]value` against an Identifier
    Identifier,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchParameter {
    pub name: &'static str,
    pub path: &'static [PathSegment],
    pub kind: ParamKind,
}

/// A resource type with a fixed table of search parameters
pub trait SearchableResource: FhirResource {
    fn search_parameters() -> &'static [SearchParameter];

    fn search_parameter(name: &str) -> Option<&'static SearchParameter> {
        Self::search_parameters().iter().find(|p| p.name == name)
    }
}

use PathSegment::{Each, Field};

const MEDICATION_REQUEST_PARAMETERS: &[SearchParameter] = &[
    SearchParameter {
        name: "_id",
        path: &[Field("id")],
        kind: ParamKind::Token,
    },
    SearchParameter {
        name: "status",
        path: &[Field("status")],
        kind: ParamKind::Token,
    },
    SearchParameter {
        name: "intent",
        path: &[Field("intent")],
        kind: ParamKind::Token,
    },
    SearchParameter {
        name: "priority",
        path: &[Field("priority")],
        kind: ParamKind::Token,
    },
    SearchParameter {
        name: "authoredon",
        path: &[Field("authoredOn")],
        kind: ParamKind::Token,
    },
    SearchParameter {
        name: "subject",
        path: &[Field("subject"), Field("reference")],
        kind: ParamKind::Reference { default_type: None },
    },
    SearchParameter {
        name: "patient",
        path: &[Field("subject"), Field("reference")],
        kind: ParamKind::Reference {
            default_type: Some("Patient"),
        },
    },
    SearchParameter {
        name: "encounter",
        path: &[Field("encounter"), Field("reference")],
        kind: ParamKind::Reference {
            default_type: Some("Encounter"),
        },
    },
    SearchParameter {
        name: "requester",
        path: &[Field("requester"), Field("reference")],
        kind: ParamKind::Reference { default_type: None },
    },
    SearchParameter {
        name: "identifier",
        path: &[Field("identifier"), Each],
        kind: ParamKind::Identifier,
    },
    SearchParameter {
        name: "code",
        path: &[Field("medicationCodeableConcept"), Field("coding"), Each],
        kind: ParamKind::Coding,
    },
    SearchParameter {
        name: "category",
        path: &[Field("category"), Each, Field("coding"), Each],
        kind: ParamKind::Coding,
    },
];

impl SearchableResource for MedicationRequest {
    fn search_parameters() -> &'static [SearchParameter] {
        MEDICATION_REQUEST_PARAMETERS
    }
}

/// Build a filter matching resources that satisfy every parameter
///
/// # Errors
/// * `NotSupported` - unknown parameter, modifier, result parameter (`_count`,
///   `_sort`, ...) or multiple OR-ed values
/// * `InvalidSearch` - empty value
pub fn build_filter<R: SearchableResource>(params: &[(String, String)]) -> Result<Filter> {
    let mut filter = Filter::all();

    for (name, value) in params {
        if name.contains(':') {
            return Err(Error::NotSupported(format!("search modifier in '{name}'")));
        }

        let param = R::search_parameter(name).ok_or_else(|| {
            Error::NotSupported(format!(
                "search parameter '{name}' on {}",
                R::RESOURCE_TYPE
            ))
        })?;

        let value = value.trim();
        if value.is_empty() {
            return Err(Error::InvalidSearch(format!(
                "search parameter '{name}' has no value"
            )));
        }
        if value.contains(',') {
            return Err(Error::NotSupported(format!(
                "multiple values for search parameter '{name}'"
            )));
        }

        let pattern = nest(param.path, leaf(param.kind, value));
        filter = filter.and(Filter::from_pattern(pattern)?);
    }

    Ok(filter)
}

fn leaf(kind: ParamKind, value: &str) -> JsonValue {
    match kind {
        ParamKind::Token => json!(value),
        ParamKind::Reference { default_type } => match default_type {
            Some(rt) if !value.contains('/') => json!(format!("{rt}/{value}")),
            _ => json!(value),
        },
        ParamKind::Coding => system_pair(value, "code"),
        ParamKind::Identifier => system_pair(value, "value"),
    }
}

/// `system|code`, `|code` (no system given) or bare `code`
fn system_pair(value: &str, value_key: &str) -> JsonValue {
    let mut object = Map::new();
    match value.split_once('|') {
        Some((system, code)) => {
            if !system.is_empty() {
                object.insert("system".to_string(), json!(system));
            }
            if !code.is_empty() {
                object.insert(value_key.to_string(), json!(code));
            }
        }
        None => {
            object.insert(value_key.to_string(), json!(value));
        }
    }
    JsonValue::Object(object)
}

fn nest(path: &[PathSegment], leaf: JsonValue) -> JsonValue {
    path.iter().rev().fold(leaf, |acc, segment| match segment {
        Field(name) => {
            let mut object = Map::new();
            object.insert((*name).to_string(), acc);
            JsonValue::Object(object)
        }
        Each => JsonValue::Array(vec![acc]),
    })
}
