use crate::state::layers::{LayerParams, DEFAULT_LAYER_COUNT};

pub const DEFAULT_COMMANDS_PER_UPDATE: usize = 200;
pub const DEFAULT_CANVAS_WIDTH: u32 = 1080;

/// Knobs a host may set before constructing a [`crate::playback::Replay`].
/// Every field is optional in serialized form.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Commands applied per playback tick. Zero is treated as one.
    pub commands_per_update: usize,
    pub layer_count: usize,
    /// Initial canvas width in pixels. Height follows from the session's aspect ratio.
    pub canvas_width: u32,
    /// Per-layer creation parameters, top-most first. Missing entries use defaults.
    pub layers: Vec<LayerParams>,
    /// Make a user-switch command reselect the active tool and buffer, rather than only
    /// rewriting the tool's user field.
    pub follow_user_switch: bool,
}
impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            commands_per_update: DEFAULT_COMMANDS_PER_UPDATE,
            layer_count: DEFAULT_LAYER_COUNT,
            canvas_width: DEFAULT_CANVAS_WIDTH,
            layers: Vec::new(),
            follow_user_switch: false,
        }
    }
}
