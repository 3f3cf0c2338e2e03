//! # Software raster
//!
//! A CPU [`RenderBackend`]. Layers are premultiplied RGBA `f32` surfaces. Strokes stamp round tips
//! into the drawing user's alpha buffer, and finalizing composites that coverage into the layer in
//! one go, so overlapping stamps within a stroke never double up.

use hashbrown::HashMap;
use rayon::prelude::*;
use redraw_core::backend::{CopyMode, RenderBackend, StrokeTarget};
use redraw_core::brush::{BrushType, Mirror};
use redraw_core::state::layers::{Layer, LayerID, LayerParams};
use redraw_core::state::tool::ToolState;
use redraw_core::state::user::AlphaBuffer;
use redraw_core::UserID;

/// Premultiplied RGBA.
pub type Pixel = [f32; 4];
const TRANSPARENT: Pixel = [0.0; 4];

/// `src` over `dst`, both premultiplied.
fn over(src: Pixel, dst: Pixel) -> Pixel {
    let keep = 1.0 - src[3];
    std::array::from_fn(|i| src[i] + dst[i] * keep)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}
impl Surface {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![TRANSPARENT; width as usize * height as usize],
        }
    }
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<Pixel> {
        (x < self.width && y < self.height)
            .then(|| self.pixels[y as usize * self.width as usize + x as usize])
    }
    pub fn clear(&mut self) {
        self.pixels.fill(TRANSPARENT);
    }
    /// Fraction of pixels with any alpha.
    #[must_use]
    pub fn coverage(&self) -> f32 {
        if self.pixels.is_empty() {
            return 0.0;
        }
        let painted = self.pixels.par_iter().filter(|px| px[3] > 0.0).count();
        painted as f32 / self.pixels.len() as f32
    }
    fn mirror(&mut self, mirror: Mirror) {
        let width = self.width as usize;
        match mirror {
            Mirror::Horizontal => self
                .pixels
                .par_chunks_mut(width)
                .for_each(<[Pixel]>::reverse),
            Mirror::Vertical => {
                let half = self.height as usize / 2;
                let (top, rest) = self.pixels.split_at_mut(half * width);
                // Skip the middle row of an odd height, it stays put.
                let bottom = &mut rest[(self.height as usize - 2 * half) * width..];
                top.par_chunks_mut(width)
                    .zip(bottom.par_chunks_mut(width).rev())
                    .for_each(|(a, b)| a.swap_with_slice(b));
            }
        }
    }
}

/// Derived per-user brush parameters, recomputed on refresh.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Tip {
    /// Premultiplied color.
    color: [f32; 4],
    ty: BrushType,
}
impl Tip {
    fn from_tool(tool: &ToolState) -> Self {
        Self {
            color: tool.color.premultiplied(),
            ty: tool.brush_type,
        }
    }
    /// Coverage at `distance` pixels from the center of a tip `radius` pixels wide.
    fn falloff(self, distance: f32, radius: f32) -> f32 {
        match self.ty {
            BrushType::Soft => {
                if radius <= 0.0 {
                    return 0.0;
                }
                let t = (1.0 - distance / radius).max(0.0);
                t * t
            }
            // One pixel of antialiasing at the edge.
            BrushType::Hard | BrushType::Eraser => (radius + 0.5 - distance).clamp(0.0, 1.0),
        }
    }
}

#[derive(Default)]
pub struct SoftwareBackend {
    width: u32,
    height: u32,
    surfaces: HashMap<LayerID, Surface>,
    tips: HashMap<UserID, Tip>,
    /// Layer resets since construction.
    replays: usize,
}
impl SoftwareBackend {
    #[must_use]
    pub fn surface(&self, layer: LayerID) -> Option<&Surface> {
        self.surfaces.get(&layer)
    }
    /// Layer resets seen, one per layer for every backward seek or resize.
    #[must_use]
    pub fn replays(&self) -> usize {
        self.replays
    }
    /// Composite visible layers into one surface. Layers come top-most first.
    #[must_use]
    pub fn flatten<'a>(&self, layers: impl Iterator<Item = &'a Layer>) -> Surface {
        let mut out = Surface::new(self.width, self.height);
        let visible: Vec<_> = layers.filter(|layer| layer.visible).collect();
        for layer in visible.into_iter().rev() {
            let Some(surface) = self.surfaces.get(&layer.id()) else {
                continue;
            };
            out.pixels
                .par_iter_mut()
                .zip(surface.pixels.par_iter())
                .for_each(|(dst, src)| *dst = over(*src, *dst));
        }
        out
    }
    fn tip(&self, user: UserID, tool: &ToolState) -> Tip {
        self.tips
            .get(&user)
            .copied()
            .unwrap_or_else(|| Tip::from_tool(tool))
    }
    fn stamp(tip: Tip, tool: &ToolState, alpha: &mut AlphaBuffer, x: f32, y: f32, pressure: f32) {
        let radius = tool.radius_at(pressure);
        let opacity = tool.opacity_at(pressure);
        if opacity <= 0.0 {
            return;
        }
        // Pixel centers sit at half coordinates.
        let reach = radius + 1.0;
        let min_x: u32 = az::saturating_cast((x - reach).floor());
        let min_y: u32 = az::saturating_cast((y - reach).floor());
        let max_x: u32 = az::saturating_cast((x + reach).ceil());
        let max_y: u32 = az::saturating_cast((y + reach).ceil());
        for py in min_y..=max_y.min(alpha.height().saturating_sub(1)) {
            for px in min_x..=max_x.min(alpha.width().saturating_sub(1)) {
                let dx = px as f32 + 0.5 - x;
                let dy = py as f32 + 0.5 - y;
                let value = tip.falloff(dx.hypot(dy), radius) * opacity;
                if value > 0.0 {
                    alpha.accumulate(px, py, value);
                }
            }
        }
    }
}
impl RenderBackend for SoftwareBackend {
    type Error = std::convert::Infallible;

    fn allocate_layer(&mut self, layer: &Layer, params: &LayerParams) -> Result<(), Self::Error> {
        log::trace!(
            "allocating {} ({})",
            layer.id(),
            params.name.as_deref().unwrap_or("unnamed")
        );
        self.surfaces
            .insert(layer.id(), Surface::new(layer.width, layer.height));
        Ok(())
    }
    fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        for surface in self.surfaces.values_mut() {
            *surface = Surface::new(width, height);
        }
    }
    fn flip(&mut self, layers: &[LayerID], mirror: Mirror) {
        for layer in layers {
            if let Some(surface) = self.surfaces.get_mut(layer) {
                surface.mirror(mirror);
            }
        }
    }
    fn clear_layer(&mut self, layer: LayerID) {
        if let Some(surface) = self.surfaces.get_mut(&layer) {
            surface.clear();
        }
    }
    fn reset_layer_for_replay(&mut self, layer: LayerID) {
        self.clear_layer(layer);
        // Tips derived from commands past the replay target must not leak into it.
        self.tips.clear();
        self.replays += 1;
    }
    fn copy_layer(&mut self, src: LayerID, dst: LayerID, mode: CopyMode) {
        let Some(source) = self.surfaces.get(&src).cloned() else {
            return;
        };
        let Some(dest) = self.surfaces.get_mut(&dst) else {
            return;
        };
        match mode {
            CopyMode::Replace => *dest = source,
            CopyMode::Underlay => dest
                .pixels
                .par_iter_mut()
                .zip(source.pixels.par_iter())
                .for_each(|(dst, src)| *dst = over(*dst, *src)),
        }
    }
    fn refresh_brush(&mut self, user: UserID, tool: &ToolState) {
        self.tips.insert(user, Tip::from_tool(tool));
    }
    fn begin_stroke(&mut self, target: StrokeTarget<'_>, x: f32, y: f32, pressure: f32) {
        let tip = self.tip(target.user, target.tool);
        Self::stamp(tip, target.tool, target.alpha, x, y, pressure);
    }
    fn continue_stroke(&mut self, target: StrokeTarget<'_>, x: f32, y: f32, pressure: f32) {
        let tip = self.tip(target.user, target.tool);
        let tool = target.tool;
        let (from_x, from_y, from_p) = (tool.last_x, tool.last_y, tool.pressure);
        let spacing = (tool.radius_at(pressure) * 0.25).max(0.5);
        let distance = (x - from_x).hypot(y - from_y);
        let steps: u32 = az::saturating_cast((distance / spacing).ceil());
        let steps = steps.max(1);
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            Self::stamp(
                tip,
                tool,
                &mut *target.alpha,
                from_x + (x - from_x) * t,
                from_y + (y - from_y) * t,
                from_p + (pressure - from_p) * t,
            );
        }
    }
    fn finalize_stroke(&mut self, target: StrokeTarget<'_>) {
        let Some([min_x, min_y, max_x, max_y]) = target.alpha.dirty_bounds() else {
            return;
        };
        let tip = self.tip(target.user, target.tool);
        let Some(surface) = self.surfaces.get_mut(&target.layer) else {
            return;
        };
        for y in min_y..=max_y.min(surface.height.saturating_sub(1)) {
            for x in min_x..=max_x.min(surface.width.saturating_sub(1)) {
                let coverage = target.alpha.get(x, y);
                let src = tip.color.map(|channel| channel * coverage);
                if src[3] <= 0.0 {
                    continue;
                }
                let idx = y as usize * surface.width as usize + x as usize;
                let dst = &mut surface.pixels[idx];
                *dst = match tip.ty {
                    BrushType::Eraser => dst.map(|channel| channel * (1.0 - src[3])),
                    BrushType::Hard | BrushType::Soft => over(src, *dst),
                };
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use redraw_core::brush::BrushSettings;
    use redraw_core::color::Color;
    use redraw_core::commands::{Command, LayerAction};
    use redraw_core::{Replay, ReplayConfig, Session, SessionHeader};

    fn replay(commands: Vec<Command>) -> Replay<SoftwareBackend> {
        let config = ReplayConfig {
            canvas_width: 64,
            ..Default::default()
        };
        let session = Session::new(SessionHeader::default(), commands);
        Replay::new(session, SoftwareBackend::default(), &config).unwrap()
    }
    fn thick() -> Command {
        Command::brush(BrushSettings {
            radius: 4.0 / 64.0,
            control: redraw_core::brush::BrushControl::empty(),
            ..Default::default()
        })
    }
    fn pixel(replay: &Replay<SoftwareBackend>, layer: usize, x: u32, y: u32) -> Pixel {
        let id = replay.layers().get(layer).unwrap().id();
        replay.backend().surface(id).unwrap().get(x, y).unwrap()
    }

    #[test]
    fn stroke_lands_on_finalize() {
        let mut replay = replay(vec![
            thick(),
            Command::color(Color::from_rgb8(255, 0, 0)),
            Command::draw(0.25, 0.5, 1.0),
            Command::draw(0.75, 0.5, 1.0),
            Command::draw_end(),
        ]);
        replay.seek(3);
        assert_eq!(pixel(&replay, 0, 32, 32), TRANSPARENT, "still in the alpha buffer");
        replay.seek_end();
        assert_eq!(pixel(&replay, 0, 32, 32), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(pixel(&replay, 0, 32, 10), TRANSPARENT);
        assert!(replay.users().get(0).unwrap().alpha.is_blank());
    }
    #[test]
    fn stroke_ended_on_missing_layer_leaves_nothing_behind() {
        let mut replay = replay(vec![
            thick(),
            Command::draw(0.25, 0.5, 1.0),
            Command::layer(LayerAction::Set, 9),
            Command::draw_end(),
            Command::layer(LayerAction::Set, 0),
            Command::draw(0.75, 0.5, 1.0),
            Command::draw_end(),
        ]);
        replay.seek(3);
        assert!(replay.users().get(0).unwrap().alpha.is_blank());
        replay.seek_end();
        assert_eq!(pixel(&replay, 0, 16, 32), TRANSPARENT);
        assert_eq!(pixel(&replay, 0, 48, 32), [0.0, 0.0, 0.0, 1.0]);
    }
    #[test]
    fn translucent_color_lands_premultiplied() {
        let mut replay = replay(vec![
            thick(),
            Command::color(Color::from_packed_argb(0x80FF_0000)),
            Command::draw(0.5, 0.5, 1.0),
            Command::draw_end(),
        ]);
        replay.seek_end();
        let alpha = 128.0 / 255.0;
        let [r, g, b, a] = pixel(&replay, 0, 32, 32);
        assert!((r - alpha).abs() < 1e-6);
        assert_eq!((g, b), (0.0, 0.0));
        assert!((a - alpha).abs() < 1e-6);
    }
    #[test]
    fn eraser_removes() {
        let mut replay = replay(vec![
            thick(),
            Command::draw(0.5, 0.5, 1.0),
            Command::draw_end(),
            Command::brush(BrushSettings {
                radius: 8.0 / 64.0,
                control: redraw_core::brush::BrushControl::empty(),
                ty: BrushType::Eraser,
                opacity: 1.0,
            }),
            Command::draw(0.5, 0.5, 1.0),
            Command::draw_end(),
        ]);
        replay.seek(2);
        assert_eq!(pixel(&replay, 0, 32, 32)[3], 1.0);
        replay.seek_end();
        assert_eq!(pixel(&replay, 0, 32, 32), TRANSPARENT);
    }
    #[test]
    fn horizontal_flip_mirrors() {
        let mut replay = replay(vec![
            thick(),
            Command::draw(0.1, 0.1, 1.0),
            Command::draw_end(),
            Command::flip(redraw_core::brush::Flip::HORIZONTAL, None),
        ]);
        replay.seek_end();
        assert_eq!(pixel(&replay, 0, 6, 6)[3], 0.0);
        assert_eq!(pixel(&replay, 0, 64 - 1 - 6, 6)[3], 1.0);
    }
    #[test]
    fn underlay_keeps_destination_on_top() {
        let red = Color::from_rgb8(255, 0, 0);
        let blue = Color::from_rgb8(0, 0, 255);
        let mut replay = replay(vec![
            thick(),
            Command::color(red),
            Command::draw(0.5, 0.5, 1.0),
            Command::draw_end(),
            Command::layer(LayerAction::Set, 3),
            Command::color(blue),
            Command::draw(0.5, 0.5, 1.0),
            Command::draw_end(),
            // Layer 3 sits beneath layer 0.
            Command::layer(LayerAction::Copy, 0),
        ]);
        replay.seek_end();
        assert_eq!(pixel(&replay, 0, 32, 32), [1.0, 0.0, 0.0, 1.0]);
    }
    #[test]
    fn flatten_puts_lower_index_on_top() {
        let mut replay = replay(vec![
            thick(),
            Command::color(Color::from_rgb8(0, 255, 0)),
            Command::layer(LayerAction::Set, 1),
            Command::draw(0.5, 0.5, 1.0),
            Command::draw_end(),
            Command::color(Color::from_rgb8(255, 255, 255)),
            Command::layer(LayerAction::Set, 0),
            Command::draw(0.5, 0.5, 1.0),
            Command::draw_end(),
        ]);
        replay.seek_end();
        let flat = replay.backend().flatten(replay.layers().iter());
        assert_eq!(flat.get(32, 32), Some([1.0, 1.0, 1.0, 1.0]));
    }
    #[test]
    fn backward_seek_matches_fresh() {
        let commands = vec![
            thick(),
            Command::draw(0.2, 0.2, 0.5),
            Command::draw(0.8, 0.6, 1.0),
            Command::draw_end(),
            Command::layer(LayerAction::Move, 2),
            Command::flip(redraw_core::brush::Flip::VERTICAL, None),
            Command::draw(0.4, 0.9, 1.0),
            Command::draw_end(),
        ];
        let mut fresh = replay(commands.clone());
        fresh.seek(4);
        let mut back = replay(commands);
        back.seek_end();
        back.seek(4);
        assert_eq!(back.backend().replays(), 5);
        for (a, b) in fresh.layers().iter().zip(back.layers().iter()) {
            assert_eq!(
                fresh.backend().surface(a.id()),
                back.backend().surface(b.id())
            );
        }
    }
    #[test]
    fn vertical_mirror_odd_height() {
        let mut surface = Surface::new(1, 3);
        surface.pixels = vec![[1.0; 4], [0.5; 4], TRANSPARENT];
        surface.mirror(Mirror::Vertical);
        assert_eq!(surface.pixels, [TRANSPARENT, [0.5; 4], [1.0; 4]]);
    }
}
