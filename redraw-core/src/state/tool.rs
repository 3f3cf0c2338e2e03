use crate::brush::{BrushControl, BrushSettings, BrushType};
use crate::color::Color;
use crate::commands::UserID;

/// Per-user drawing attributes, rebuilt deterministically by replaying commands.
///
/// Only the dispatcher mutates this. Backends read it during stroke and brush calls.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolState {
    /// Stack index of the layer strokes land on.
    pub layer: usize,
    /// Last stroke point, in canvas pixels.
    pub last_x: f32,
    pub last_y: f32,
    /// Pressure at the last stroke point.
    pub pressure: f32,
    /// A stroke has begun and not yet been finalized.
    pub is_drawing: bool,
    pub color: Color,
    /// In canvas pixels.
    pub brush_radius: f32,
    pub brush_control: BrushControl,
    pub brush_type: BrushType,
    pub opacity: f32,
    /// The "current user" field. Written by user-switch commands, see [`crate::dispatch`].
    pub user: UserID,
}
impl ToolState {
    /// Fresh state for `user`, brush radius scaled to a canvas `canvas_width` pixels wide.
    #[must_use]
    pub fn new(user: UserID, canvas_width: u32) -> Self {
        let mut tool = Self {
            layer: 0,
            last_x: 0.0,
            last_y: 0.0,
            pressure: 0.0,
            is_drawing: false,
            color: Color::default(),
            brush_radius: 0.0,
            brush_control: BrushControl::empty(),
            brush_type: BrushType::default(),
            opacity: 1.0,
            user,
        };
        tool.apply_brush(BrushSettings::default(), canvas_width);
        tool
    }
    /// Take all four brush fields at once. Radius arrives normalized to canvas width.
    pub fn apply_brush(&mut self, brush: BrushSettings, canvas_width: u32) {
        self.brush_radius = crate::util::denormalize(brush.radius, canvas_width);
        self.brush_control = brush.control;
        self.brush_type = brush.ty;
        self.opacity = brush.opacity.clamp(0.0, 1.0);
    }
    /// Record a stroke point, marking a stroke as in progress.
    pub fn record_point(&mut self, x: f32, y: f32, pressure: f32) {
        self.last_x = x;
        self.last_y = y;
        self.pressure = pressure;
        self.is_drawing = true;
    }
    /// Stamp radius at the given pressure, honoring the control mode.
    #[must_use]
    pub fn radius_at(&self, pressure: f32) -> f32 {
        if self.brush_control.contains(BrushControl::PRESSURE_SIZE) {
            self.brush_radius * pressure.clamp(0.0, 1.0)
        } else {
            self.brush_radius
        }
    }
    /// Stamp opacity at the given pressure, honoring the control mode.
    #[must_use]
    pub fn opacity_at(&self, pressure: f32) -> f32 {
        if self.brush_control.contains(BrushControl::PRESSURE_OPACITY) {
            self.opacity * pressure.clamp(0.0, 1.0)
        } else {
            self.opacity
        }
    }
}
