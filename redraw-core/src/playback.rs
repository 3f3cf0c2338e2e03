//! # Playback
//!
//! [`Replay`] owns the cursor into a session and rebuilds state to match it. The cursor is the
//! only record of how far the session has been applied: after any call returns, the layer stack,
//! every user's tool and buffer, and the backend's pixels equal the result of applying commands
//! `[0, cursor]` in order.
//!
//! Forward seeks apply just the commands between the old cursor and the target. Command effects
//! are not invertible and nothing is snapshotted, so a backward seek blanks everything and replays
//! from the first command.
//!
//! Playback is cooperative. [`Replay::play`] asks the host's [`FrameScheduler`] for a frame, and
//! the host calls [`Replay::tick`] when that frame comes around. Each tick applies one batch and,
//! while there is more to play, asks for the next frame.

use crate::backend::RenderBackend;
use crate::commands::UserID;
use crate::config::ReplayConfig;
use crate::dispatch::{CommandConsumer, Dispatcher};
use crate::session::{Session, SessionHeader};
use crate::state::layers::LayerStack;
use crate::state::user::UserRegistry;
use crate::state::{Canvas, CanvasError, ReplayState};

/// The host's per-frame hook.
pub trait FrameScheduler {
    /// Arrange for [`Replay::tick`] to be called once, at the next frame.
    fn request_frame(&mut self);
}

/// Drops every request. Hosts using this drive [`Replay::tick`] on their own.
#[derive(Copy, Clone, Debug, Default)]
pub struct ManualScheduler;
impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) {}
}

/// A flag shared between a replay and a host loop. Requests set it, the host takes it.
#[derive(Clone, Debug, Default)]
pub struct FrameRequest(std::rc::Rc<std::cell::Cell<bool>>);
impl FrameRequest {
    /// Whether a frame was requested since the last call, clearing the request.
    #[must_use]
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.0.get()
    }
}
impl FrameScheduler for FrameRequest {
    fn request_frame(&mut self) {
        self.0.set(true);
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ReplayError {
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error("a replay needs at least one layer")]
    NoLayers,
    #[error("backend failed to allocate layers")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlaybackState {
    is_playing: bool,
    commands_per_update: usize,
    /// Last applied command, `None` before the first.
    cursor: Option<usize>,
    /// A frame was requested and has not ticked yet.
    frame_pending: bool,
}
impl PlaybackState {
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }
    #[must_use]
    pub fn commands_per_update(&self) -> usize {
        self.commands_per_update
    }
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }
    /// Cursor with "nothing applied" as `-1`.
    fn signed_cursor(&self) -> isize {
        self.cursor.map_or(-1, az::saturating_cast)
    }
}

/// Called after every seek with the new cursor.
pub type UpdateCallback = Box<dyn FnMut(Option<usize>)>;

pub struct Replay<B: RenderBackend> {
    session: Session,
    state: ReplayState,
    backend: B,
    playback: PlaybackState,
    scheduler: Box<dyn FrameScheduler>,
    on_update: Option<UpdateCallback>,
}
impl<B: RenderBackend> Replay<B> {
    /// Size the canvas from the session's aspect ratio and allocate the layer stack. Nothing is
    /// applied yet, the cursor starts before the first command.
    pub fn new(session: Session, mut backend: B, config: &ReplayConfig) -> Result<Self, ReplayError> {
        let canvas = Canvas::from_width(config.canvas_width, session.header().aspect_ratio)?;
        if config.layer_count == 0 {
            return Err(ReplayError::NoLayers);
        }
        backend.set_canvas_size(canvas.width, canvas.height);
        let layers = LayerStack::new(config.layer_count, &config.layers, canvas, &mut backend)
            .map_err(|err| ReplayError::Backend(Box::new(err)))?;
        log::info!(
            "replaying {:?}: {} commands on {}x{}, {} layers",
            session.header().title.as_deref().unwrap_or("untitled"),
            session.len(),
            canvas.width,
            canvas.height,
            layers.len(),
        );

        Ok(Self {
            session,
            state: ReplayState::new(canvas, layers, config.follow_user_switch),
            backend,
            playback: PlaybackState {
                is_playing: false,
                commands_per_update: config.commands_per_update.max(1),
                cursor: None,
                frame_pending: false,
            },
            scheduler: Box::new(ManualScheduler),
            on_update: None,
        })
    }
    pub fn set_scheduler(&mut self, scheduler: impl FrameScheduler + 'static) {
        self.scheduler = Box::new(scheduler);
    }
    /// Register the post-seek notification, replacing any previous one.
    pub fn on_update(&mut self, callback: impl FnMut(Option<usize>) + 'static) {
        self.on_update = Some(Box::new(callback));
    }

    #[must_use]
    pub fn header(&self) -> &SessionHeader {
        self.session.header()
    }
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }
    /// Number of commands in the session.
    #[must_use]
    pub fn len(&self) -> usize {
        self.session.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.session.is_empty()
    }
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.playback.cursor
    }
    #[must_use]
    pub fn playback(&self) -> PlaybackState {
        self.playback
    }
    /// Every command has been applied. Trivially true for an empty session.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        match self.session.len().checked_sub(1) {
            None => true,
            Some(last) => self.playback.cursor == Some(last),
        }
    }
    /// Fraction of the session applied, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        match (self.playback.cursor, self.session.len()) {
            (_, 0) => 1.0,
            (None, _) => 0.0,
            (Some(cursor), len) => (cursor + 1) as f32 / len as f32,
        }
    }
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playback.is_playing
    }
    #[must_use]
    pub fn commands_per_update(&self) -> usize {
        self.playback.commands_per_update
    }
    /// Set the playback rate. Zero is treated as one.
    pub fn set_commands_per_update(&mut self, commands: usize) {
        self.playback.commands_per_update = commands.max(1);
    }
    #[must_use]
    pub fn canvas(&self) -> Canvas {
        self.state.canvas()
    }
    #[must_use]
    pub fn layers(&self) -> &LayerStack {
        self.state.layers()
    }
    #[must_use]
    pub fn users(&self) -> &UserRegistry {
        self.state.users()
    }
    #[must_use]
    pub fn active_user(&self) -> UserID {
        self.state.active_user()
    }
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Move the cursor to `target`, clamped into the session. Fires the update callback once,
    /// even when nothing had to be applied.
    pub fn seek(&mut self, target: isize) {
        let Some(last) = self.session.len().checked_sub(1) else {
            self.notify();
            return;
        };
        let target = az::saturating_cast::<isize, usize>(target).min(last);
        match self.playback.cursor {
            Some(cursor) if target == cursor => (),
            Some(cursor) if target < cursor => {
                log::debug!("seek {cursor} -> {target}, replaying from the start");
                self.state.reset(&mut self.backend);
                self.apply(0, target);
            }
            cursor => {
                let start = cursor.map_or(0, |cursor| cursor + 1);
                log::debug!("seek {cursor:?} -> {target}, applying {}", target + 1 - start);
                self.apply(start, target);
            }
        }
        self.playback.cursor = Some(target);
        self.notify();
    }
    pub fn seek_start(&mut self) {
        self.seek(0);
    }
    pub fn seek_end(&mut self) {
        self.seek(az::saturating_cast::<usize, isize>(self.session.len()) - 1);
    }
    pub fn seek_next(&mut self) {
        self.seek(self.playback.signed_cursor() + 1);
    }
    pub fn seek_prev(&mut self) {
        self.seek(self.playback.signed_cursor() - 1);
    }

    pub fn play(&mut self) {
        if self.playback.is_playing {
            return;
        }
        log::info!("play from {:?}", self.playback.cursor);
        self.playback.is_playing = true;
        self.request_frame();
    }
    /// Takes effect at the next tick. A batch in flight always completes.
    pub fn pause(&mut self) {
        if self.playback.is_playing {
            log::info!("pause at {:?}", self.playback.cursor);
        }
        self.playback.is_playing = false;
    }
    /// The playback loop body. Call once per frame requested through the scheduler.
    pub fn tick(&mut self) {
        self.playback.frame_pending = false;
        if !self.playback.is_playing {
            return;
        }
        let batch: isize = az::saturating_cast(self.playback.commands_per_update);
        self.seek(self.playback.signed_cursor().saturating_add(batch));
        if self.playback.is_playing && !self.is_at_end() {
            self.request_frame();
        } else {
            log::info!("playback finished at {:?}", self.playback.cursor);
            self.playback.is_playing = false;
        }
    }

    /// Resize the canvas, keeping the session's aspect ratio, then rebuild the applied range at the
    /// new resolution. Fires the update callback once if anything changed.
    pub fn set_canvas_width(&mut self, width: u32) {
        let canvas = self.state.canvas().with_width(width);
        if canvas == self.state.canvas() {
            return;
        }
        log::info!("canvas resized to {}x{}", canvas.width, canvas.height);
        self.state.set_canvas(canvas, &mut self.backend);
        self.state.reset(&mut self.backend);
        if let Some(cursor) = self.playback.cursor {
            self.apply(0, cursor);
        }
        self.notify();
    }

    fn apply(&mut self, start: usize, end: usize) {
        let mut dispatcher = Dispatcher::new(&mut self.state, &mut self.backend);
        for (_, command) in self.session.range(start, end) {
            dispatcher.apply(command);
        }
    }
    fn request_frame(&mut self) {
        if !self.playback.frame_pending {
            self.playback.frame_pending = true;
            self.scheduler.request_frame();
        }
    }
    fn notify(&mut self) {
        if let Some(callback) = &mut self.on_update {
            callback(self.playback.cursor);
        }
    }
}
