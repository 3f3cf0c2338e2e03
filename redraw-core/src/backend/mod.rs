//! # Backends
//!
//! The engine never touches pixels. Every visible effect goes through a [`RenderBackend`], which a
//! host implements for its target surface. [`recording::RecordingBackend`] is a pixel-free
//! implementation that logs calls and models layer contents symbolically.

pub mod recording;

use crate::brush::Mirror;
use crate::commands::UserID;
use crate::state::layers::{Layer, LayerID, LayerParams};
use crate::state::tool::ToolState;
use crate::state::user::AlphaBuffer;

/// How a layer copy treats the destination's existing content.
#[derive(strum::AsRefStr, Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum CopyMode {
    /// The destination becomes an exact copy of the source.
    Replace,
    /// The source is composited beneath the destination's existing content.
    Underlay,
}

/// Everything a stroke call may need, borrowed from the active user.
pub struct StrokeTarget<'a> {
    /// Layer the stroke lands on when finalized.
    pub layer: LayerID,
    /// The user whose context is drawing.
    pub user: UserID,
    /// For continuations, `last_x`/`last_y`/`pressure` still hold the previous point.
    pub tool: &'a ToolState,
    /// The user's coverage buffer. Stamps accumulate here, finalize commits and may clear it.
    pub alpha: &'a mut AlphaBuffer,
}

pub trait RenderBackend {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create storage for a new layer. Called once per layer, at construction.
    fn allocate_layer(&mut self, layer: &Layer, params: &LayerParams) -> Result<(), Self::Error>;
    /// Every layer is now this size. Contents may be discarded, the engine replays afterwards.
    fn set_canvas_size(&mut self, width: u32, height: u32);
    /// Mirror every listed layer.
    fn flip(&mut self, layers: &[LayerID], mirror: Mirror);
    /// Blank a layer's pixels.
    fn clear_layer(&mut self, layer: LayerID);
    /// Blank a layer ahead of a replay from the first command. Also the place to drop any
    /// bookkeeping that only makes sense for the previous pass.
    fn reset_layer_for_replay(&mut self, layer: LayerID) {
        self.clear_layer(layer);
    }
    fn copy_layer(&mut self, src: LayerID, dst: LayerID, mode: CopyMode);
    /// Color or brush changed for `user`, recompute anything derived from them.
    fn refresh_brush(&mut self, user: UserID, tool: &ToolState);
    /// First point of a stroke: a single stamp, no line. Pixel coordinates.
    fn begin_stroke(&mut self, target: StrokeTarget<'_>, x: f32, y: f32, pressure: f32);
    /// Segment from the tool's last point to this one. Pixel coordinates.
    fn continue_stroke(&mut self, target: StrokeTarget<'_>, x: f32, y: f32, pressure: f32);
    /// Commit the user's accumulated coverage into the target layer.
    fn finalize_stroke(&mut self, target: StrokeTarget<'_>);
}
