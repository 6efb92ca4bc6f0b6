use crate::layers::params::{ParamValues, Params};

/// Stable layer identity, assigned monotonically by the owning [`LayerManager`](super::LayerManager).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct LayerId(pub u64);

/// A named, togglable, opacity-weighted binding of an effect and its parameters.
///
/// Invariants: `effect_id == None` implies no parameters; `opacity` stays in `[0, 1]`; `id` never
/// changes. Mutation goes through the manager so these hold.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    id: LayerId,
    name: String,
    visible: bool,
    opacity: f32,
    effect_id: Option<String>,
    parameters: Params,
}

impl Layer {
    pub(crate) fn new(id: LayerId, name: String) -> Self {
        Self {
            id,
            name,
            visible: true,
            opacity: 1.0,
            effect_id: None,
            parameters: Params::new(),
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn effect_id(&self) -> Option<&str> {
        self.effect_id.as_deref()
    }

    pub fn parameters(&self) -> &Params {
        &self.parameters
    }

    /// Whether composition would do anything with this layer.
    pub fn is_renderable(&self) -> bool {
        self.visible && self.opacity > 0.0 && self.effect_id.is_some()
    }

    pub fn to_payload(&self) -> LayerPayload {
        LayerPayload {
            effect_id: self.effect_id.clone(),
            visible: self.visible,
            opacity: self.opacity,
            parameters: self.parameters.values(),
        }
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Clamp into `[0, 1]`; NaN becomes 0.
    pub(crate) fn set_opacity(&mut self, opacity: f32) -> f32 {
        self.opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
        self.opacity
    }

    pub(crate) fn bind_effect(&mut self, effect_id: String, parameters: Params) {
        self.effect_id = Some(effect_id);
        self.parameters = parameters;
    }

    pub(crate) fn clear_effect(&mut self) {
        self.effect_id = None;
        self.parameters = Params::new();
    }

    pub(crate) fn parameters_mut(&mut self) -> &mut Params {
        &mut self.parameters
    }
}

/// Plain-data view of a layer: what composition and the render worker consume.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_id: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub parameters: ParamValues,
}

fn default_visible() -> bool {
    true
}

fn default_opacity() -> f32 {
    1.0
}

impl LayerPayload {
    pub fn effect(effect_id: impl Into<String>, opacity: f32, parameters: ParamValues) -> Self {
        Self {
            effect_id: Some(effect_id.into()),
            visible: true,
            opacity,
            parameters,
        }
    }

    pub fn is_renderable(&self) -> bool {
        self.visible && self.opacity > 0.0 && self.effect_id.is_some()
    }
}
