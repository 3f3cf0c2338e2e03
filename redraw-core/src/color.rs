use crate::util::{FiniteF32, FiniteF32Error};

/// A straight-alpha brush color, every channel within `[0, 1]`.
///
/// Capture formats hand colors over as packed bytes, so the common constructors are
/// [`Color::from_rgb8`] and [`Color::from_packed_argb`]. Backends that composite premultiplied
/// (the usual case) take [`Color::premultiplied`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Color([FiniteF32; 4]);
impl Color {
    pub const BLACK: Self = Self([
        FiniteF32::ZERO,
        FiniteF32::ZERO,
        FiniteF32::ZERO,
        FiniteF32::ONE,
    ]);
    /// Create from straight channels. Out of range values are clamped, non-finite ones rejected.
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Result<Self, FiniteF32Error> {
        let clamp = |v: f32| FiniteF32::new(v).map(|v| FiniteF32::unit_lossy(v.get()));
        Ok(Self([clamp(r)?, clamp(g)?, clamp(b)?, clamp(a)?]))
    }
    /// Opaque color from 8-bit channels.
    #[must_use]
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        let unit = |v: u8| FiniteF32::unit_lossy(f32::from(v) / 255.0);
        Self([unit(r), unit(g), unit(b), FiniteF32::ONE])
    }
    /// Unpack `0xAARRGGBB`.
    #[must_use]
    pub fn from_packed_argb(packed: u32) -> Self {
        let [a, r, g, b] = packed.to_be_bytes();
        let mut color = Self::from_rgb8(r, g, b);
        color.0[3] = FiniteF32::unit_lossy(f32::from(a) / 255.0);
        color
    }
    /// Pack into `0xAARRGGBB`, rounding to the nearest byte.
    #[must_use]
    pub fn to_packed_argb(&self) -> u32 {
        let byte = |v: FiniteF32| (v.get() * 255.0).round() as u8;
        u32::from_be_bytes([byte(self.0[3]), byte(self.0[0]), byte(self.0[1]), byte(self.0[2])])
    }
    #[must_use]
    pub fn as_array(&self) -> [f32; 4] {
        self.0.map(FiniteF32::get)
    }
    /// Channels with color multiplied by alpha.
    #[must_use]
    pub fn premultiplied(&self) -> [f32; 4] {
        let [r, g, b, a] = self.as_array();
        [r * a, g * a, b * a, a]
    }
}
impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}
