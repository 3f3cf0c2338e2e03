//! # Commands
//!
//! A session is an ordered log of [`Command`]s as delivered by a capture-format parser. The log format
//! overloads some kinds: what a draw-end or color-change *means* depends on which optional fields are
//! populated. [`Command::action`] resolves that once, producing an explicit [`Action`] that the
//! dispatcher matches on.

use crate::brush::{BrushSettings, Flip, Mirror};
use crate::color::Color;

/// Identifies the author of a command within a session.
pub type UserID = u32;

/// Raw discriminant of a log entry.
#[derive(strum::AsRefStr, Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum CommandKind {
    Draw,
    DrawEnd,
    ColorChange,
    SizeChange,
    /// A kind this version does not understand. Replayed as a no-op.
    Unknown(u8),
}
impl CommandKind {
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Draw,
            1 => Self::DrawEnd,
            2 => Self::ColorChange,
            3 => Self::SizeChange,
            other => Self::Unknown(other),
        }
    }
}

/// What a draw-end carrying a layer index does with it.
#[derive(strum::AsRefStr, strum::EnumIter, Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum LayerAction {
    /// Make the layer active.
    #[default]
    Set,
    /// Move the active layer to this stack position.
    Move,
    /// Blank the layer.
    Clear,
    /// Copy the active layer onto this one.
    Copy,
}
impl LayerAction {
    /// Interpret a raw byte from the log. Unknown values select.
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Move,
            2 => Self::Clear,
            3 => Self::Copy,
            _ => Self::Set,
        }
    }
}

/// One immutable entry of the session log, fields as the parser found them.
///
/// Fields irrelevant to `kind` are left at their defaults by the parser and ignored here.
#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    pub kind: CommandKind,
    /// Normalized `[0, 1]` canvas position.
    pub x: f32,
    pub y: f32,
    pub pressure: f32,
    pub layer: Option<u32>,
    pub layer_action: LayerAction,
    pub color: Option<Color>,
    pub flip: Flip,
    pub user: Option<UserID>,
    pub brush: BrushSettings,
}
impl Default for Command {
    fn default() -> Self {
        Self {
            kind: CommandKind::Unknown(u8::MAX),
            x: 0.0,
            y: 0.0,
            pressure: 0.0,
            layer: None,
            layer_action: LayerAction::Set,
            color: None,
            flip: Flip::empty(),
            user: None,
            brush: BrushSettings::default(),
        }
    }
}
// Shorthand constructors, mostly for hosts synthesizing sessions and for tests.
impl Command {
    #[must_use]
    pub fn draw(x: f32, y: f32, pressure: f32) -> Self {
        Self {
            kind: CommandKind::Draw,
            x,
            y,
            pressure,
            ..Default::default()
        }
    }
    #[must_use]
    pub fn draw_end() -> Self {
        Self {
            kind: CommandKind::DrawEnd,
            ..Default::default()
        }
    }
    #[must_use]
    pub fn layer(action: LayerAction, layer: u32) -> Self {
        Self {
            kind: CommandKind::DrawEnd,
            layer: Some(layer),
            layer_action: action,
            ..Default::default()
        }
    }
    #[must_use]
    pub fn color(color: Color) -> Self {
        Self {
            kind: CommandKind::ColorChange,
            color: Some(color),
            ..Default::default()
        }
    }
    #[must_use]
    pub fn flip(flip: Flip, user: Option<UserID>) -> Self {
        Self {
            kind: CommandKind::ColorChange,
            flip,
            user,
            ..Default::default()
        }
    }
    #[must_use]
    pub fn brush(brush: BrushSettings) -> Self {
        Self {
            kind: CommandKind::SizeChange,
            brush,
            ..Default::default()
        }
    }
    #[must_use]
    pub fn unknown(raw: u8) -> Self {
        Self {
            kind: CommandKind::Unknown(raw),
            ..Default::default()
        }
    }
    /// Resolve the overloaded kind into the action this entry performs.
    #[must_use]
    pub fn action(&self) -> Action {
        match self.kind {
            CommandKind::Draw => Action::StrokePoint {
                x: self.x,
                y: self.y,
                pressure: self.pressure,
            },
            CommandKind::DrawEnd => match self.layer {
                None => Action::StrokeEnd,
                Some(layer) => Action::Layer {
                    action: self.layer_action,
                    layer: layer as usize,
                },
            },
            CommandKind::ColorChange => match self.color {
                Some(color) => Action::Color(color),
                None => Action::FlipAndUser {
                    mirror: self.flip.mirror(),
                    user: self.user,
                },
            },
            CommandKind::SizeChange => Action::Brush(self.brush),
            CommandKind::Unknown(raw) => Action::Ignored(raw),
        }
    }
}

/// The explicit meaning of a [`Command`], one variant per row of the overload table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    /// Begin a stroke, or continue the one in progress. Normalized coordinates.
    StrokePoint { x: f32, y: f32, pressure: f32 },
    /// Commit the stroke in progress to the active layer.
    StrokeEnd,
    Layer { action: LayerAction, layer: usize },
    Color(Color),
    /// Optional whole-canvas mirror, plus an optional update of the tool's user field.
    FlipAndUser {
        mirror: Option<Mirror>,
        user: Option<UserID>,
    },
    Brush(BrushSettings),
    /// Unknown kind, carrying its raw discriminant.
    Ignored(u8),
}
impl Action {
    /// Short name, for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::StrokePoint { .. } => "stroke-point",
            Self::StrokeEnd => "stroke-end",
            Self::Layer { .. } => "layer",
            Self::Color(_) => "color",
            Self::FlipAndUser { .. } => "flip-user",
            Self::Brush(_) => "brush",
            Self::Ignored(_) => "ignored",
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::brush::BrushType;

    #[test]
    fn draw_end_discriminates_on_layer() {
        assert_eq!(Command::draw_end().action(), Action::StrokeEnd);
        assert_eq!(
            Command::layer(LayerAction::Copy, 3).action(),
            Action::Layer {
                action: LayerAction::Copy,
                layer: 3
            }
        );
    }
    #[test]
    fn color_change_discriminates_on_color() {
        let red = Color::from_rgb8(255, 0, 0);
        assert_eq!(Command::color(red).action(), Action::Color(red));
        assert_eq!(
            Command::flip(Flip::VERTICAL, Some(4)).action(),
            Action::FlipAndUser {
                mirror: Some(Mirror::Vertical),
                user: Some(4)
            }
        );
        // Color wins over flip flags when both are present.
        let both = Command {
            flip: Flip::HORIZONTAL,
            ..Command::color(red)
        };
        assert_eq!(both.action(), Action::Color(red));
    }
    #[test]
    fn size_change_carries_all_fields() {
        let brush = BrushSettings {
            radius: 0.02,
            ty: BrushType::Soft,
            opacity: 0.25,
            ..Default::default()
        };
        assert_eq!(Command::brush(brush).action(), Action::Brush(brush));
    }
    #[test]
    fn unknown_kinds() {
        assert_eq!(CommandKind::from_raw(9), CommandKind::Unknown(9));
        assert_eq!(Command::unknown(9).action(), Action::Ignored(9));
    }
    #[test]
    fn layer_action_raw() {
        use strum::IntoEnumIterator;
        for (raw, action) in (0u8..).zip(LayerAction::iter()) {
            assert_eq!(LayerAction::from_raw(raw), action);
        }
    }
}
