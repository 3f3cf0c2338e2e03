//! # Brush
//!
//! Brush parameters carried by size-change commands, and the mirror flags carried by flips.

bitflags::bitflags! {
    /// How stylus pressure modulates a stamp.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct BrushControl : u8 {
        /// Pressure scales stamp radius.
        const PRESSURE_SIZE    = 0b0000_0001;
        /// Pressure scales stamp opacity.
        const PRESSURE_OPACITY = 0b0000_0010;
    }
}
impl BrushControl {
    /// Interpret a raw byte from the log. Unknown bits are dropped.
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        Self::from_bits_truncate(raw)
    }
}

/// Shape of a brush tip.
#[derive(
    strum::AsRefStr,
    strum::EnumIter,
    PartialEq,
    Eq,
    Copy,
    Clone,
    Hash,
    Debug,
    Default,
)]
#[repr(u8)]
pub enum BrushType {
    /// Solid disc with an antialiased rim.
    #[default]
    Hard = 0,
    /// Coverage falls off towards the rim.
    Soft = 1,
    /// Removes coverage from the layer instead of adding color.
    Eraser = 2,
}
impl BrushType {
    /// Interpret a raw byte from the log. Unknown tips fall back to [`BrushType::Hard`].
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Soft,
            2 => Self::Eraser,
            0 => Self::Hard,
            other => {
                log::trace!("unknown brush type {other}, using hard tip");
                Self::Hard
            }
        }
    }
}

/// The four brush fields a size-change command always carries together.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BrushSettings {
    /// Radius as a fraction of canvas width.
    pub radius: f32,
    pub control: BrushControl,
    pub ty: BrushType,
    /// `[0, 1]`
    pub opacity: f32,
}
impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            radius: 0.005,
            control: BrushControl::PRESSURE_SIZE,
            ty: BrushType::Hard,
            opacity: 1.0,
        }
    }
}

bitflags::bitflags! {
    /// Flip flags of a color-change command that carries no color.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct Flip : u8 {
        /// Mirror left-right.
        const HORIZONTAL = 0b0000_0001;
        /// Mirror top-bottom.
        const VERTICAL   = 0b0000_0010;
    }
}
impl Flip {
    /// The single mirror this flag set produces. Horizontal wins when both are set.
    #[must_use]
    pub fn mirror(self) -> Option<Mirror> {
        if self.contains(Self::HORIZONTAL) {
            Some(Mirror::Horizontal)
        } else if self.contains(Self::VERTICAL) {
            Some(Mirror::Vertical)
        } else {
            None
        }
    }
}

/// Axis of a whole-canvas mirror.
#[derive(strum::AsRefStr, Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Mirror {
    Horizontal,
    Vertical,
}
