//! A backend that draws nothing. It records each call, and keeps a symbolic list of [`Mark`]s per
//! layer standing in for pixels, so two replays can be compared for identical output.

use super::{CopyMode, RenderBackend, StrokeTarget};
use crate::brush::{BrushType, Mirror};
use crate::commands::UserID;
use crate::state::layers::{Layer, LayerID, LayerParams};
use crate::state::tool::ToolState;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    AllocateLayer(LayerID),
    SetCanvasSize { width: u32, height: u32 },
    Flip(Mirror),
    ClearLayer(LayerID),
    ResetLayer(LayerID),
    CopyLayer {
        src: LayerID,
        dst: LayerID,
        mode: CopyMode,
    },
    RefreshBrush(UserID),
    BeginStroke {
        layer: LayerID,
        user: UserID,
        pos: [f32; 2],
        pressure: f32,
    },
    ContinueStroke {
        layer: LayerID,
        user: UserID,
        from: [f32; 2],
        to: [f32; 2],
        pressure: f32,
    },
    FinalizeStroke { layer: LayerID, user: UserID },
}

/// Symbolic layer content, bottom-most first.
#[derive(Clone, Debug, PartialEq)]
pub enum Mark {
    Stroke {
        points: Vec<[f32; 2]>,
        /// `0xAARRGGBB`
        color: u32,
        radius: f32,
        ty: BrushType,
    },
    Mirrored(Mirror),
}

#[derive(Clone, Debug, Default)]
struct PendingStroke {
    points: Vec<[f32; 2]>,
}

#[derive(thiserror::Error, Debug)]
pub enum RecordingError {
    #[error("allocation budget of {0} layers exhausted")]
    Exhausted(usize),
}

#[derive(Default, Debug)]
pub struct RecordingBackend {
    calls: Vec<Call>,
    contents: hashbrown::HashMap<LayerID, Vec<Mark>>,
    pending: hashbrown::HashMap<UserID, PendingStroke>,
    /// Refuse to allocate more than this many layers.
    budget: Option<usize>,
}
impl RecordingBackend {
    /// A backend whose allocations fail past `max_layers`.
    #[must_use]
    pub fn with_budget(max_layers: usize) -> Self {
        Self {
            budget: Some(max_layers),
            ..Self::default()
        }
    }
    #[must_use]
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }
    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }
    /// Number of recorded calls matching a predicate.
    #[must_use]
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| pred(call)).count()
    }
    /// Symbolic content of a layer, bottom-most mark first.
    #[must_use]
    pub fn contents(&self, layer: LayerID) -> &[Mark] {
        self.contents.get(&layer).map(Vec::as_slice).unwrap_or_default()
    }
}
impl RenderBackend for RecordingBackend {
    type Error = RecordingError;

    fn allocate_layer(&mut self, layer: &Layer, _params: &LayerParams) -> Result<(), Self::Error> {
        if let Some(budget) = self.budget {
            if self.contents.len() >= budget {
                return Err(RecordingError::Exhausted(budget));
            }
        }
        self.calls.push(Call::AllocateLayer(layer.id()));
        self.contents.insert(layer.id(), Vec::new());
        Ok(())
    }
    fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.calls.push(Call::SetCanvasSize { width, height });
    }
    fn flip(&mut self, layers: &[LayerID], mirror: Mirror) {
        self.calls.push(Call::Flip(mirror));
        for layer in layers {
            self.contents
                .entry(*layer)
                .or_default()
                .push(Mark::Mirrored(mirror));
        }
    }
    fn clear_layer(&mut self, layer: LayerID) {
        self.calls.push(Call::ClearLayer(layer));
        self.contents.entry(layer).or_default().clear();
    }
    fn reset_layer_for_replay(&mut self, layer: LayerID) {
        self.calls.push(Call::ResetLayer(layer));
        self.contents.entry(layer).or_default().clear();
        self.pending.clear();
    }
    fn copy_layer(&mut self, src: LayerID, dst: LayerID, mode: CopyMode) {
        self.calls.push(Call::CopyLayer { src, dst, mode });
        let source = self.contents.get(&src).cloned().unwrap_or_default();
        let dest = self.contents.entry(dst).or_default();
        match mode {
            CopyMode::Replace => *dest = source,
            CopyMode::Underlay => {
                let above = std::mem::replace(dest, source);
                dest.extend(above);
            }
        }
    }
    fn refresh_brush(&mut self, user: UserID, _tool: &ToolState) {
        self.calls.push(Call::RefreshBrush(user));
    }
    fn begin_stroke(&mut self, target: StrokeTarget<'_>, x: f32, y: f32, pressure: f32) {
        self.calls.push(Call::BeginStroke {
            layer: target.layer,
            user: target.user,
            pos: [x, y],
            pressure,
        });
        self.pending.insert(
            target.user,
            PendingStroke {
                points: vec![[x, y]],
            },
        );
    }
    fn continue_stroke(&mut self, target: StrokeTarget<'_>, x: f32, y: f32, pressure: f32) {
        self.calls.push(Call::ContinueStroke {
            layer: target.layer,
            user: target.user,
            from: [target.tool.last_x, target.tool.last_y],
            to: [x, y],
            pressure,
        });
        self.pending
            .entry(target.user)
            .or_default()
            .points
            .push([x, y]);
    }
    fn finalize_stroke(&mut self, target: StrokeTarget<'_>) {
        self.calls.push(Call::FinalizeStroke {
            layer: target.layer,
            user: target.user,
        });
        let Some(pending) = self.pending.remove(&target.user) else {
            return;
        };
        self.contents.entry(target.layer).or_default().push(Mark::Stroke {
            points: pending.points,
            color: target.tool.color.to_packed_argb(),
            radius: target.tool.brush_radius,
            ty: target.tool.brush_type,
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn underlay_puts_source_beneath() {
        let mut backend = RecordingBackend::default();
        let a = LayerID::default();
        let b = LayerID::default();
        backend.flip(&[a], Mirror::Horizontal);
        backend.flip(&[b], Mirror::Vertical);
        backend.copy_layer(a, b, CopyMode::Underlay);
        assert_eq!(
            backend.contents(b),
            [
                Mark::Mirrored(Mirror::Horizontal),
                Mark::Mirrored(Mirror::Vertical)
            ]
        );
        backend.copy_layer(a, b, CopyMode::Replace);
        assert_eq!(backend.contents(b), [Mark::Mirrored(Mirror::Horizontal)]);
    }
    #[test]
    fn budget_limits_allocation() {
        let mut backend = RecordingBackend::with_budget(1);
        let params = LayerParams::default();
        assert!(backend
            .allocate_layer(&Layer::new(1, 1, true), &params)
            .is_ok());
        assert!(matches!(
            backend.allocate_layer(&Layer::new(1, 1, true), &params),
            Err(RecordingError::Exhausted(1))
        ));
    }
}
