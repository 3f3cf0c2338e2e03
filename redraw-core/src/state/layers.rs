//! # Layers
//!
//! A fixed set of layers created up front. Position in the stack is compositing order: index 0 is
//! on top, and each higher index sits beneath the ones before it. Layers are never destroyed, only
//! moved, cleared, copied onto, flipped or resized.

use super::Canvas;
use crate::backend::{CopyMode, RenderBackend};
use crate::brush::Mirror;

pub type LayerID = crate::id::ReplayID<Layer>;

/// Default number of layers a replay starts with.
pub const DEFAULT_LAYER_COUNT: usize = 5;

/// Creation parameters for one layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayerParams {
    pub visible: bool,
    pub name: Option<String>,
}
impl Default for LayerParams {
    fn default() -> Self {
        Self {
            visible: true,
            name: None,
        }
    }
}

/// Opaque handle to a backend surface, with the size and visibility the engine tracks for it.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    id: LayerID,
    pub width: u32,
    pub height: u32,
    pub visible: bool,
}
impl Layer {
    /// A fresh handle. Only the stack creates layers.
    pub(crate) fn new(width: u32, height: u32, visible: bool) -> Self {
        Self {
            id: LayerID::default(),
            width,
            height,
            visible,
        }
    }
    #[must_use]
    pub fn id(&self) -> LayerID {
        self.id
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerError {
    #[error("layer index {index} out of range for a stack of {len}")]
    OutOfRange { index: usize, len: usize },
}

#[derive(Clone, Debug)]
pub struct LayerStack {
    layers: smallvec::SmallVec<[Layer; DEFAULT_LAYER_COUNT]>,
    /// Order at construction, restored before a full replay.
    initial: smallvec::SmallVec<[Layer; DEFAULT_LAYER_COUNT]>,
}
impl LayerStack {
    /// Allocate `count` layers through the backend. Layers past the end of `params` use defaults.
    pub fn new<B: RenderBackend>(
        count: usize,
        params: &[LayerParams],
        canvas: Canvas,
        backend: &mut B,
    ) -> Result<Self, B::Error> {
        let default_params = LayerParams::default();
        let layers = (0..count)
            .map(|index| {
                let params = params.get(index).unwrap_or(&default_params);
                let layer = Layer::new(canvas.width, canvas.height, params.visible);
                backend.allocate_layer(&layer, params)?;
                log::trace!("allocated {} at index {index}", layer.id);
                Ok(layer)
            })
            .collect::<Result<smallvec::SmallVec<[Layer; DEFAULT_LAYER_COUNT]>, B::Error>>()?;

        Ok(Self {
            initial: layers.clone(),
            layers,
        })
    }
    fn check(&self, index: usize) -> Result<(), LayerError> {
        if index < self.layers.len() {
            Ok(())
        } else {
            Err(LayerError::OutOfRange {
                index,
                len: self.layers.len(),
            })
        }
    }
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
    /// Top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.layers.iter()
    }
    /// IDs, top to bottom.
    #[must_use]
    pub fn ids(&self) -> smallvec::SmallVec<[LayerID; DEFAULT_LAYER_COUNT]> {
        self.layers.iter().map(Layer::id).collect()
    }
    #[must_use]
    pub fn index_of(&self, id: LayerID) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id == id)
    }
    /// Remove the layer at `src` and reinsert it at `dst`, shifting the layers between.
    pub fn move_layer(&mut self, src: usize, dst: usize) -> Result<(), LayerError> {
        self.check(src)?;
        self.check(dst)?;
        let layer = self.layers.remove(src);
        self.layers.insert(dst, layer);
        Ok(())
    }
    pub fn clear(&mut self, index: usize, backend: &mut impl RenderBackend) -> Result<(), LayerError> {
        self.check(index)?;
        backend.clear_layer(self.layers[index].id);
        Ok(())
    }
    /// Copy `src` onto `dst`. A source beneath its destination is composited under the destination's
    /// content, otherwise it replaces it. Returns the mode used.
    pub fn copy(
        &mut self,
        src: usize,
        dst: usize,
        backend: &mut impl RenderBackend,
    ) -> Result<CopyMode, LayerError> {
        self.check(src)?;
        self.check(dst)?;
        let mode = if src > dst {
            CopyMode::Underlay
        } else {
            CopyMode::Replace
        };
        backend.copy_layer(self.layers[src].id, self.layers[dst].id, mode);
        Ok(mode)
    }
    pub fn flip(&mut self, mirror: Mirror, backend: &mut impl RenderBackend) {
        backend.flip(&self.ids(), mirror);
    }
    /// Blank a layer ahead of a replay from the first command.
    pub fn reset_for_replay(
        &mut self,
        index: usize,
        backend: &mut impl RenderBackend,
    ) -> Result<(), LayerError> {
        self.check(index)?;
        backend.reset_layer_for_replay(self.layers[index].id);
        Ok(())
    }
    /// Put every layer back where it was at construction.
    pub fn restore_initial_order(&mut self) {
        self.layers.clone_from(&self.initial);
    }
    /// Return to construction order and blank every layer.
    pub(crate) fn reset_all(&mut self, backend: &mut impl RenderBackend) {
        self.restore_initial_order();
        for index in 0..self.layers.len() {
            if let Err(e) = self.reset_for_replay(index, backend) {
                log::warn!("could not reset layer {index}: {e}");
            }
        }
    }
    pub(crate) fn set_canvas_size(&mut self, canvas: Canvas) {
        for layer in self.layers.iter_mut().chain(self.initial.iter_mut()) {
            layer.width = canvas.width;
            layer.height = canvas.height;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::backend::recording::{Call, RecordingBackend};

    fn stack(backend: &mut RecordingBackend) -> LayerStack {
        let canvas = Canvas::from_width(10, 1.0).unwrap();
        LayerStack::new(DEFAULT_LAYER_COUNT, &[], canvas, backend).unwrap()
    }

    #[test]
    fn allocates_through_backend() {
        let mut backend = RecordingBackend::default();
        let params = [LayerParams {
            visible: false,
            name: Some("sketch".into()),
        }];
        let canvas = Canvas::from_width(10, 2.0).unwrap();
        let layers = LayerStack::new(3, &params, canvas, &mut backend).unwrap();
        assert_eq!(layers.len(), 3);
        assert!(!layers.get(0).unwrap().visible);
        assert!(layers.get(1).unwrap().visible);
        assert_eq!(layers.get(2).unwrap().height, 5);
        let allocated: Vec<_> = backend
            .calls()
            .iter()
            .filter_map(|call| match call {
                Call::AllocateLayer(id) => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(allocated.as_slice(), layers.ids().as_slice());
    }
    #[test]
    fn move_is_a_splice() {
        let mut backend = RecordingBackend::default();
        let mut layers = stack(&mut backend);
        let before = layers.ids();
        layers.move_layer(0, 3).unwrap();
        let after = layers.ids();
        assert_eq!(
            after.as_slice(),
            [before[1], before[2], before[3], before[0], before[4]]
        );
        layers.move_layer(4, 1).unwrap();
        assert_eq!(
            layers.ids().as_slice(),
            [before[1], before[4], before[2], before[3], before[0]]
        );
        assert_eq!(
            layers.move_layer(5, 0),
            Err(LayerError::OutOfRange { index: 5, len: 5 })
        );
    }
    #[test]
    fn copy_mode_follows_stack_order() {
        let mut backend = RecordingBackend::default();
        let mut layers = stack(&mut backend);
        assert_eq!(layers.copy(3, 1, &mut backend), Ok(CopyMode::Underlay));
        assert_eq!(layers.copy(1, 3, &mut backend), Ok(CopyMode::Replace));
        assert!(layers.copy(1, 9, &mut backend).is_err());
    }
    #[test]
    fn reset_restores_order() {
        let mut backend = RecordingBackend::default();
        let mut layers = stack(&mut backend);
        let initial = layers.ids();
        layers.move_layer(4, 0).unwrap();
        layers.set_canvas_size(Canvas::from_width(20, 1.0).unwrap());
        backend.take_calls();
        layers.reset_all(&mut backend);
        assert_eq!(layers.ids(), initial);
        assert!(layers.iter().all(|layer| layer.width == 20));
        let resets: Vec<_> = backend
            .take_calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::ResetLayer(id) => Some(id),
                _ => None,
            })
            .collect();
        assert_eq!(resets.as_slice(), initial.as_slice());
    }
    #[test]
    fn single_reset_keeps_order() {
        let mut backend = RecordingBackend::default();
        let mut layers = stack(&mut backend);
        layers.move_layer(0, 4).unwrap();
        let moved = layers.ids();
        backend.take_calls();
        layers.reset_for_replay(4, &mut backend).unwrap();
        assert_eq!(layers.ids(), moved);
        assert_eq!(backend.take_calls(), [Call::ResetLayer(moved[4])]);
        assert!(layers.reset_for_replay(5, &mut backend).is_err());
        layers.restore_initial_order();
        assert_eq!(layers.ids()[0], moved[4]);
    }
}
