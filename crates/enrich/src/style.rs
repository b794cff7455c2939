//! Fill colors and tooltips for enriched documents.
//!
//! The renderer shades each polygon from the injected value: red and green
//! rise with `value / scale`, blue falls, alpha is fixed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{feature_key, features, features_mut, properties_mut};
use crate::enrich::number_value;
use crate::error::{EnrichError, FieldOwner};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillRamp {
    /// Value at which red/green saturate and blue reaches zero.
    pub scale: f64,
    pub alpha: u8,
}

impl Default for FillRamp {
    fn default() -> Self {
        Self { scale: 1000.0, alpha: 100 }
    }
}

impl FillRamp {
    pub fn color(&self, value: f64) -> [u8; 4] {
        let t = if self.scale == 0.0 { 0.0 } else { value / self.scale * 255.0 };
        [channel(t), channel(t), channel(255.0 - t), self.alpha]
    }
}

fn channel(v: f64) -> u8 {
    if v.is_nan() {
        0
    } else {
        v.round().clamp(0.0, 255.0) as u8
    }
}

/// Static layer settings a renderer needs alongside the styled document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerStyle {
    pub filled: bool,
    pub stroked: bool,
    pub extruded: bool,
    pub pickable: bool,
    pub auto_highlight: bool,
    pub line_color: [u8; 4],
    pub line_width: u32,
    pub opacity: f32,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            filled: true,
            stroked: true,
            extruded: false,
            pickable: true,
            auto_highlight: true,
            line_color: [0, 0, 0, 100],
            line_width: 1,
            opacity: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleOptions {
    /// Property holding the region name, shown in the tooltip.
    pub name_field: String,
    /// Property holding the injected value.
    pub value_field: String,
    pub ramp: FillRamp,
}

impl StyleOptions {
    pub fn new(name_field: impl Into<String>, value_field: impl Into<String>) -> Self {
        Self {
            name_field: name_field.into(),
            value_field: value_field.into(),
            ramp: FillRamp::default(),
        }
    }
}

/// Copy `doc` and add `fill_color` and `tooltip` to every feature.
pub fn style_document(doc: &Value, opts: &StyleOptions) -> Result<Value, EnrichError> {
    features(doc)?;
    let mut styled = doc.clone();

    for (i, feature) in features_mut(&mut styled)?.iter_mut().enumerate() {
        let name = feature_key(i, feature, &opts.name_field)?;
        let raw = feature
            .get("properties")
            .and_then(|p| p.get(&opts.value_field))
            .filter(|v| !v.is_null())
            .ok_or_else(|| EnrichError::MissingField {
                owner: FieldOwner::Feature(i),
                field: opts.value_field.clone(),
            })?;
        let value = raw.as_f64().ok_or_else(|| EnrichError::ValueCoercion {
            owner: FieldOwner::Feature(i),
            field: opts.value_field.clone(),
            value: raw.to_string(),
        })?;

        let tooltip = format!("{name}\n{}: {}", opts.value_field, number_value(value));
        let color = opts.ramp.color(value);
        if let Some(props) = properties_mut(feature) {
            props.insert("fill_color".into(), Value::from(color.to_vec()));
            props.insert("tooltip".into(), Value::from(tooltip));
        }
    }

    Ok(styled)
}
