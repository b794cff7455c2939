//! Feature-collection shape checks over `serde_json::Value`.
//!
//! Geometry is never inspected. A document is accepted when it is an object
//! with `"type": "FeatureCollection"` and a `features` array whose entries
//! are objects with `properties` either an object or `null`.

use serde_json::{Map, Value};

use crate::error::{EnrichError, FieldOwner};

/// Parse and shape-check a boundary document.
pub fn parse_boundary(text: &str) -> Result<Value, EnrichError> {
    let doc: Value = serde_json::from_str(text)
        .map_err(|e| EnrichError::MalformedDocument(format!("invalid JSON: {e}")))?;
    features(&doc)?;
    Ok(doc)
}

/// The `features` array of a feature collection.
pub fn features(doc: &Value) -> Result<&Vec<Value>, EnrichError> {
    let obj = doc
        .as_object()
        .ok_or_else(|| EnrichError::MalformedDocument("top level is not an object".into()))?;

    match obj.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {}
        Some(other) => {
            return Err(EnrichError::MalformedDocument(format!(
                "expected type FeatureCollection, found {other}"
            )))
        }
        None => {
            return Err(EnrichError::MalformedDocument("missing \"type\" member".into()))
        }
    }

    let list = obj
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| EnrichError::MalformedDocument("missing \"features\" array".into()))?;

    for (i, feature) in list.iter().enumerate() {
        check_feature(i, feature)?;
    }
    Ok(list)
}

pub(crate) fn features_mut(doc: &mut Value) -> Result<&mut Vec<Value>, EnrichError> {
    features(doc)?;
    doc.get_mut("features")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| EnrichError::MalformedDocument("missing \"features\" array".into()))
}

fn check_feature(index: usize, feature: &Value) -> Result<(), EnrichError> {
    let obj = feature.as_object().ok_or_else(|| {
        EnrichError::MalformedDocument(format!("feature {index} is not an object"))
    })?;
    match obj.get("properties") {
        None | Some(Value::Null) | Some(Value::Object(_)) => Ok(()),
        Some(_) => Err(EnrichError::MalformedDocument(format!(
            "feature {index}: \"properties\" is not an object"
        ))),
    }
}

/// Properties of a feature, if it has any.
pub fn properties(feature: &Value) -> Option<&Map<String, Value>> {
    feature.get("properties").and_then(Value::as_object)
}

/// Properties of a feature, created as an empty object when absent or null.
pub(crate) fn properties_mut(feature: &mut Value) -> Option<&mut Map<String, Value>> {
    let obj = feature.as_object_mut()?;
    let slot = obj.entry("properties").or_insert(Value::Null);
    if slot.is_null() {
        *slot = Value::Object(Map::new());
    }
    slot.as_object_mut()
}

/// Region name of feature `index`, read from property `key`.
///
/// Strings are used as-is and numbers by their JSON text. A missing or null
/// property is a missing field; any other type is a malformed document.
pub fn feature_key(index: usize, feature: &Value, key: &str) -> Result<String, EnrichError> {
    let missing = || EnrichError::MissingField {
        owner: FieldOwner::Feature(index),
        field: key.to_string(),
    };
    match properties(feature).and_then(|p| p.get(key)) {
        None | Some(Value::Null) => Err(missing()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(EnrichError::MalformedDocument(format!(
            "feature {index}: property '{key}' is {}, expected a string",
            type_name(other)
        ))),
    }
}

/// Region names of every feature, in document order.
pub fn region_names(doc: &Value, key: &str) -> Result<Vec<String>, EnrichError> {
    features(doc)?
        .iter()
        .enumerate()
        .map(|(i, f)| feature_key(i, f, key))
        .collect()
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
