use std::collections::BTreeMap;

use crate::foundation::color::Rgb8;
use crate::foundation::error::{LayerforgeError, LayerforgeResult};

/// A single effect parameter value.
///
/// JSON form is untagged: `true`, `0.5`, `"#ff0000"`, `"text"`. Colour and text share the string
/// representation; [`ParamValue::coerce_like`] resolves the ambiguity against a schema entry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Color(Rgb8),
    Text(String),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            Self::Number(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgb8> {
        match self {
            Self::Color(c) => Some(*c),
            Self::Text(s) => Rgb8::parse_hex(s).ok(),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Color(_) => "colour",
            Self::Text(_) => "string",
        }
    }

    /// Convert `self` to the variant of `template`, if a lossless conversion exists.
    pub fn coerce_like(&self, template: &ParamValue) -> Option<ParamValue> {
        match (template, self) {
            (Self::Number(_), Self::Number(v)) if v.is_finite() => Some(Self::Number(*v)),
            (Self::Bool(_), Self::Bool(v)) => Some(Self::Bool(*v)),
            (Self::Color(_), Self::Color(c)) => Some(Self::Color(*c)),
            (Self::Color(_), Self::Text(s)) => Rgb8::parse_hex(s).ok().map(Self::Color),
            (Self::Text(_), Self::Text(s)) => Some(Self::Text(s.clone())),
            (Self::Text(_), Self::Color(c)) => Some(Self::Text(c.to_hex())),
            _ => None,
        }
    }
}

/// Schema entry for one parameter: current value plus editing metadata.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParamDescriptor {
    pub value: ParamValue,
    /// `[min, max]`; present iff `value` is a number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

impl ParamDescriptor {
    pub fn number(value: f64, min: f64, max: f64, step: f64) -> Self {
        Self {
            value: ParamValue::Number(value.clamp(min, max)),
            range: Some([min, max]),
            step: Some(step),
        }
    }

    pub fn flag(value: bool) -> Self {
        Self {
            value: ParamValue::Bool(value),
            range: None,
            step: None,
        }
    }

    pub fn color(value: Rgb8) -> Self {
        Self {
            value: ParamValue::Color(value),
            range: None,
            step: None,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: ParamValue::Text(value.into()),
            range: None,
            step: None,
        }
    }

    pub fn validate(&self, name: &str) -> LayerforgeResult<()> {
        match (&self.value, self.range) {
            (ParamValue::Number(v), Some([min, max])) => {
                if !(min.is_finite() && max.is_finite() && min <= max) {
                    return Err(LayerforgeError::invalid_input(format!(
                        "parameter '{name}' has an invalid range [{min}, {max}]"
                    )));
                }
                if !v.is_finite() {
                    return Err(LayerforgeError::invalid_input(format!(
                        "parameter '{name}' must be finite"
                    )));
                }
                Ok(())
            }
            (ParamValue::Number(_), None) => Err(LayerforgeError::invalid_input(format!(
                "numeric parameter '{name}' requires a range"
            ))),
            (_, Some(_)) => Err(LayerforgeError::invalid_input(format!(
                "parameter '{name}' is not numeric and must not carry a range"
            ))),
            (_, None) => Ok(()),
        }
    }

    /// Replace the value, clamping numbers into `range`. Returns `false` on a type mismatch.
    fn assign(&mut self, value: &ParamValue) -> bool {
        let Some(mut next) = value.coerce_like(&self.value) else {
            return false;
        };
        if let (ParamValue::Number(v), Some([min, max])) = (&mut next, self.range) {
            *v = v.clamp(min, max);
        }
        self.value = next;
        true
    }
}

/// Ordered parameter schema + bindings held by a layer.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamDescriptor>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, desc: ParamDescriptor) -> Self {
        self.0.insert(name.into(), desc);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, desc: ParamDescriptor) {
        self.0.insert(name.into(), desc);
    }

    pub fn get(&self, name: &str) -> Option<&ParamDescriptor> {
        self.0.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name).map(|d| &d.value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamDescriptor)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn validate(&self) -> LayerforgeResult<()> {
        for (name, desc) in &self.0 {
            desc.validate(name)?;
        }
        Ok(())
    }

    /// Pull every numeric value inside its declared range.
    pub fn clamp_to_ranges(&mut self) {
        for desc in self.0.values_mut() {
            if let (ParamValue::Number(v), Some([min, max])) = (&mut desc.value, desc.range) {
                *v = v.clamp(min, max);
            }
        }
    }

    /// Override the `step` of every numeric descriptor.
    pub fn set_numeric_step(&mut self, step: f64) {
        for desc in self.0.values_mut() {
            if matches!(desc.value, ParamValue::Number(_)) {
                desc.step = Some(step);
            }
        }
    }

    /// Update `value` fields named in `partial`; unknown names and type mismatches are skipped.
    ///
    /// Returns the names that were actually updated.
    pub fn update_values(&mut self, partial: &ParamValues) -> Vec<String> {
        let mut applied = Vec::new();
        for (name, value) in partial.iter() {
            let Some(desc) = self.0.get_mut(name) else {
                tracing::debug!(param = name, "ignoring unknown parameter");
                continue;
            };
            if desc.assign(value) {
                applied.push(name.to_owned());
            } else {
                tracing::debug!(
                    param = name,
                    expected = desc.value.kind(),
                    got = value.kind(),
                    "ignoring parameter with mismatched type"
                );
            }
        }
        applied
    }

    /// Plain values, without schema metadata.
    pub fn values(&self) -> ParamValues {
        ParamValues(
            self.0
                .iter()
                .map(|(k, d)| (k.clone(), d.value.clone()))
                .collect(),
        )
    }
}

/// Name → value bindings, the form effects and the worker consume.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ParamValues(BTreeMap<String, ParamValue>);

impl ParamValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: ParamValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn number(&self, name: &str, default: f32) -> f32 {
        self.0
            .get(name)
            .and_then(ParamValue::as_number)
            .filter(|v| v.is_finite())
            .map_or(default, |v| v as f32)
    }

    pub fn flag(&self, name: &str, default: bool) -> bool {
        self.0
            .get(name)
            .and_then(ParamValue::as_bool)
            .unwrap_or(default)
    }

    pub fn color(&self, name: &str, default: Rgb8) -> Rgb8 {
        self.0
            .get(name)
            .and_then(ParamValue::as_color)
            .unwrap_or(default)
    }
}

impl FromIterator<(String, ParamValue)> for ParamValues {
    fn from_iter<T: IntoIterator<Item = (String, ParamValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/params.rs"]
mod tests;
