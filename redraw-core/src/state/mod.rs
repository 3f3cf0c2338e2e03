//! # State
//!
//! Everything a replay rebuilds from the command log: canvas size, the layer stack, and users.
//! All of it must always equal the result of applying commands `[0, cursor]` in order.

pub mod layers;
pub mod tool;
pub mod user;

use crate::backend::RenderBackend;
use crate::commands::UserID;

/// The user whose tool and buffer commands act on when a replay starts.
pub const INITIAL_USER: UserID = 0;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum CanvasError {
    #[error("aspect ratio must be positive and finite, got {0}")]
    InvalidAspectRatio(f32),
}

/// Canvas size in pixels. Height always follows from width and the session's aspect ratio.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f32,
}
impl Canvas {
    /// `height = width / aspect_ratio`, rounded, at least one pixel. Zero width is bumped to one.
    pub fn from_width(width: u32, aspect_ratio: f32) -> Result<Self, CanvasError> {
        if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
            return Err(CanvasError::InvalidAspectRatio(aspect_ratio));
        }
        Ok(Self::sized(width, aspect_ratio))
    }
    /// Same aspect ratio, new width.
    #[must_use]
    pub fn with_width(self, width: u32) -> Self {
        Self::sized(width, self.aspect_ratio)
    }
    fn sized(width: u32, aspect_ratio: f32) -> Self {
        let width = width.max(1);
        let height: u32 = az::saturating_cast((width as f32 / aspect_ratio).round());
        Self {
            width,
            height: height.max(1),
            aspect_ratio,
        }
    }
}

/// Derived state of a replay, borrowed by the dispatcher while commands are applied.
#[derive(Debug)]
pub struct ReplayState {
    pub(crate) canvas: Canvas,
    pub(crate) layers: layers::LayerStack,
    pub(crate) users: user::UserRegistry,
    /// Whose tool and buffer the dispatcher is acting on.
    pub(crate) active_user: UserID,
    /// Reselect the active user on user-switch commands.
    pub(crate) follow_user_switch: bool,
}
impl ReplayState {
    pub(crate) fn new(
        canvas: Canvas,
        layers: layers::LayerStack,
        follow_user_switch: bool,
    ) -> Self {
        Self {
            canvas,
            layers,
            users: user::UserRegistry::new(canvas),
            active_user: INITIAL_USER,
            follow_user_switch,
        }
    }
    #[must_use]
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }
    #[must_use]
    pub fn layers(&self) -> &layers::LayerStack {
        &self.layers
    }
    #[must_use]
    pub fn users(&self) -> &user::UserRegistry {
        &self.users
    }
    #[must_use]
    pub fn active_user(&self) -> UserID {
        self.active_user
    }
    /// Blank every layer and user, as if no command had been applied.
    pub(crate) fn reset(&mut self, backend: &mut impl RenderBackend) {
        self.layers.reset_all(backend);
        self.users.reset();
        self.active_user = INITIAL_USER;
    }
    /// Propagate a new canvas size to the backend, layers and user buffers.
    /// Leaves pixel state stale, the caller replays.
    pub(crate) fn set_canvas(&mut self, canvas: Canvas, backend: &mut impl RenderBackend) {
        self.canvas = canvas;
        backend.set_canvas_size(canvas.width, canvas.height);
        self.layers.set_canvas_size(canvas);
        self.users.set_canvas(canvas);
    }
}
