//! # Users
//!
//! Every user referenced by a session gets a [`UserState`]: a [`ToolState`] and an alpha buffer the
//! size of the canvas, where a stroke accumulates coverage until it is finalized into a layer.
//! Users are created on first reference and live as long as the replay.

use super::{tool::ToolState, Canvas};
use crate::commands::UserID;

/// Per-pixel stroke coverage in `[0, 1]`, row-major.
///
/// Writes go through [`AlphaBuffer::accumulate`], which tracks the touched region so clearing after
/// a stroke only visits pixels the stroke reached.
#[derive(Clone, PartialEq)]
pub struct AlphaBuffer {
    width: u32,
    height: u32,
    coverage: Vec<f32>,
    /// Inclusive `[min_x, min_y, max_x, max_y]` of written pixels.
    dirty: Option<[u32; 4]>,
}
impl AlphaBuffer {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0.0; width as usize * height as usize],
            dirty: None,
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
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }
    /// Coverage at a pixel, zero outside the buffer.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.index(x, y).map_or(0.0, |idx| self.coverage[idx])
    }
    /// Raise coverage at a pixel to at least `value`. Out of bounds writes are dropped.
    pub fn accumulate(&mut self, x: u32, y: u32, value: f32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let value = value.clamp(0.0, 1.0);
        if value <= self.coverage[idx] {
            return;
        }
        self.coverage[idx] = value;
        self.dirty = Some(match self.dirty {
            None => [x, y, x, y],
            Some([min_x, min_y, max_x, max_y]) => {
                [min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y)]
            }
        });
    }
    /// Region written since the last clear, inclusive `[min_x, min_y, max_x, max_y]`.
    #[must_use]
    pub fn dirty_bounds(&self) -> Option<[u32; 4]> {
        self.dirty
    }
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.dirty.is_none()
    }
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.coverage
    }
    /// Zero the touched region.
    pub fn clear(&mut self) {
        let Some([min_x, min_y, max_x, max_y]) = self.dirty.take() else {
            return;
        };
        let width = self.width as usize;
        for y in min_y as usize..=max_y as usize {
            let row = &mut self.coverage[y * width..(y + 1) * width];
            row[min_x as usize..=max_x as usize].fill(0.0);
        }
    }
    /// Reallocate for a new canvas size. Contents are dropped.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }
    fn byte_size(&self) -> usize {
        std::mem::size_of_val(self.coverage.as_slice())
    }
}
impl std::fmt::Debug for AlphaBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UserState {
    pub tool: ToolState,
    pub alpha: AlphaBuffer,
}
impl UserState {
    fn new(user: UserID, canvas: Canvas) -> Self {
        Self {
            tool: ToolState::new(user, canvas.width),
            alpha: AlphaBuffer::new(canvas.width, canvas.height),
        }
    }
}

/// Users by ID, grown lazily and never shrunk.
#[derive(Clone, Debug)]
pub struct UserRegistry {
    users: hashbrown::HashMap<UserID, UserState>,
    canvas: Canvas,
}
impl UserRegistry {
    #[must_use]
    pub fn new(canvas: Canvas) -> Self {
        Self {
            users: hashbrown::HashMap::new(),
            canvas,
        }
    }
    #[must_use]
    pub fn get(&self, user: UserID) -> Option<&UserState> {
        self.users.get(&user)
    }
    /// Fetch a user, creating a blank one on first reference.
    pub fn get_or_insert(&mut self, user: UserID) -> &mut UserState {
        let canvas = self.canvas;
        self.users.entry(user).or_insert_with(|| {
            let state = UserState::new(user, canvas);
            log::debug!(
                "new user {user}, {} alpha buffer",
                human_bytes::human_bytes(state.alpha.byte_size() as f64)
            );
            state
        })
    }
    pub fn iter(&self) -> impl Iterator<Item = (UserID, &UserState)> + '_ {
        self.users.iter().map(|(id, state)| (*id, state))
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
    /// Return every known user to a blank tool and buffer, keeping the entries.
    pub(crate) fn reset(&mut self) {
        let canvas = self.canvas;
        for (id, state) in &mut self.users {
            state.tool = ToolState::new(*id, canvas.width);
            state.alpha.clear();
        }
    }
    /// Resize every buffer for a new canvas. Follow with [`Self::reset`] and a replay.
    pub(crate) fn set_canvas(&mut self, canvas: Canvas) {
        self.canvas = canvas;
        for state in self.users.values_mut() {
            state.alpha.resize(canvas.width, canvas.height);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn canvas() -> Canvas {
        Canvas::from_width(8, 2.0).unwrap()
    }

    #[test]
    fn accumulate_keeps_max_and_tracks_bounds() {
        let mut alpha = AlphaBuffer::new(8, 4);
        alpha.accumulate(2, 1, 0.5);
        alpha.accumulate(2, 1, 0.25);
        alpha.accumulate(5, 3, 1.5);
        // Out of bounds, dropped.
        alpha.accumulate(8, 0, 1.0);
        assert_eq!(alpha.get(2, 1), 0.5);
        assert_eq!(alpha.get(5, 3), 1.0);
        assert_eq!(alpha.dirty_bounds(), Some([2, 1, 5, 3]));
        alpha.clear();
        assert!(alpha.is_blank());
        assert!(alpha.as_slice().iter().all(|v| *v == 0.0));
    }
    #[test]
    fn users_are_lazy_and_persistent() {
        let mut users = UserRegistry::new(canvas());
        assert!(users.is_empty());
        users.get_or_insert(3).tool.layer = 2;
        users.get_or_insert(3).alpha.accumulate(0, 0, 1.0);
        assert_eq!(users.len(), 1);
        assert_eq!(users.get(3).map(|u| u.tool.layer), Some(2));

        users.reset();
        // Entry survives, contents do not.
        let user = users.get(3).unwrap();
        assert_eq!(user.tool, ToolState::new(3, 8));
        assert!(user.alpha.is_blank());
    }
    #[test]
    fn buffers_follow_canvas() {
        let mut users = UserRegistry::new(canvas());
        users.get_or_insert(0);
        users.set_canvas(Canvas::from_width(16, 2.0).unwrap());
        let alpha = &users.get(0).unwrap().alpha;
        assert_eq!((alpha.width(), alpha.height()), (16, 8));
    }
}
