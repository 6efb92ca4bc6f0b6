use crate::foundation::error::{LayerforgeError, LayerforgeResult};
use crate::layers::layer::{Layer, LayerId, LayerPayload};
use crate::layers::params::{ParamValues, Params};

/// Ordered layer stack (index 0 is the bottom) plus the current selection.
///
/// `Clone` is deep: a cloned manager shares nothing with its source, which is what history
/// snapshots rely on.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct LayerManager {
    layers: Vec<Layer>,
    selected: Option<usize>,
    next_id: u64,
}

/// Equality covers the layers and the selection; the id counter is bookkeeping.
impl PartialEq for LayerManager {
    fn eq(&self, other: &Self) -> bool {
        self.layers == other.layers && self.selected == other.selected
    }
}

impl LayerManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_layer(&self) -> Option<&Layer> {
        self.selected.and_then(|i| self.layers.get(i))
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id)
    }

    pub fn has_renderable_layers(&self) -> bool {
        self.layers.iter().any(Layer::is_renderable)
    }

    /// Plain-data copy of the stack, bottom to top.
    pub fn render_payload(&self) -> Vec<LayerPayload> {
        self.layers.iter().map(Layer::to_payload).collect()
    }

    fn check_index(&self, index: usize) -> LayerforgeResult<()> {
        if index >= self.layers.len() {
            return Err(LayerforgeError::invalid_input(format!(
                "layer index {index} out of range (len {})",
                self.layers.len()
            )));
        }
        Ok(())
    }

    fn layer_mut(&mut self, index: usize) -> LayerforgeResult<&mut Layer> {
        self.check_index(index)?;
        Ok(&mut self.layers[index])
    }

    /// Append a layer on top and select it.
    pub fn add_layer(&mut self, name: Option<&str>) -> &Layer {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        let name = match name {
            Some(n) if !n.trim().is_empty() => n.to_owned(),
            _ => format!("Layer {}", self.layers.len() + 1),
        };
        self.layers.push(Layer::new(id, name));
        let index = self.layers.len() - 1;
        self.selected = Some(index);
        &self.layers[index]
    }

    /// Remove layer `index`; the selection moves to the same position, clamped.
    pub fn delete_layer(&mut self, index: usize) -> LayerforgeResult<Layer> {
        self.check_index(index)?;
        let removed = self.layers.remove(index);
        self.selected = if self.layers.is_empty() {
            None
        } else {
            Some(index.min(self.layers.len() - 1))
        };
        Ok(removed)
    }

    /// Flip visibility; returns the new value.
    pub fn toggle_visibility(&mut self, index: usize) -> LayerforgeResult<bool> {
        let layer = self.layer_mut(index)?;
        let visible = !layer.visible();
        layer.set_visible(visible);
        Ok(visible)
    }

    /// Set opacity, clamped into `[0, 1]`; returns the stored value.
    pub fn set_opacity(&mut self, index: usize, opacity: f32) -> LayerforgeResult<f32> {
        Ok(self.layer_mut(index)?.set_opacity(opacity))
    }

    /// Bind `effect_id` with `params`, replacing (not merging) any previous parameters.
    ///
    /// `step`, when given, overrides the step of every numeric parameter.
    pub fn add_layer_effect(
        &mut self,
        index: usize,
        effect_id: &str,
        mut params: Params,
        step: Option<f64>,
    ) -> LayerforgeResult<()> {
        self.check_index(index)?;
        if effect_id.trim().is_empty() {
            return Err(LayerforgeError::invalid_input("effect id must be non-empty"));
        }
        params.validate()?;
        params.clamp_to_ranges();
        if let Some(step) = step {
            if !(step.is_finite() && step > 0.0) {
                return Err(LayerforgeError::invalid_input("step must be finite and > 0"));
            }
            params.set_numeric_step(step);
        }
        self.layers[index].bind_effect(effect_id.to_owned(), params);
        Ok(())
    }

    pub fn clear_layer_effect(&mut self, index: usize) -> LayerforgeResult<()> {
        self.layer_mut(index)?.clear_effect();
        Ok(())
    }

    /// Update the `value` of each named parameter; unknown names are ignored.
    ///
    /// Returns the names that changed.
    pub fn update_layer_parameters(
        &mut self,
        index: usize,
        partial: &ParamValues,
    ) -> LayerforgeResult<Vec<String>> {
        Ok(self.layer_mut(index)?.parameters_mut().update_values(partial))
    }

    pub fn rename_layer(&mut self, index: usize, name: &str) -> LayerforgeResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LayerforgeError::invalid_input("layer name must be non-empty"));
        }
        self.layer_mut(index)?.set_name(name.to_owned());
        Ok(())
    }

    /// Swap with the layer above. The top layer stays put. Returns the new index.
    pub fn move_layer_up(&mut self, index: usize) -> LayerforgeResult<usize> {
        self.check_index(index)?;
        let target = if index + 1 < self.layers.len() {
            self.layers.swap(index, index + 1);
            index + 1
        } else {
            index
        };
        self.selected = Some(target);
        Ok(target)
    }

    /// Swap with the layer below. The bottom layer stays put. Returns the new index.
    pub fn move_layer_down(&mut self, index: usize) -> LayerforgeResult<usize> {
        self.check_index(index)?;
        let target = if index > 0 {
            self.layers.swap(index, index - 1);
            index - 1
        } else {
            index
        };
        self.selected = Some(target);
        Ok(target)
    }

    pub fn set_selected(&mut self, index: Option<usize>) -> LayerforgeResult<()> {
        if let Some(i) = index {
            self.check_index(i)?;
        }
        self.selected = index;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/manager.rs"]
mod tests;
