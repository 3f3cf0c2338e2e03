//! # Dispatch
//!
//! Applies one command to the replay state, calling into the backend for anything visible.
//!
//! Commands act on the *active user*'s tool and alpha buffer. A user-switch command (a color change
//! without a color) writes the tool's `user` field, but unless the replay was configured to follow
//! user switches the active user stays where it is.

use crate::backend::{RenderBackend, StrokeTarget};
use crate::commands::{Action, Command, LayerAction};
use crate::state::user::UserState;
use crate::state::ReplayState;
use crate::util::denormalize;

pub trait CommandConsumer<C> {
    /// Apply a single command. Well-formedness is the producer's job, so this cannot fail.
    fn apply(&mut self, command: &C);
}

/// Short-lived pairing of the replay state with a backend, for the duration of one seek.
pub struct Dispatcher<'a, B: RenderBackend> {
    state: &'a mut ReplayState,
    backend: &'a mut B,
}
impl<'a, B: RenderBackend> Dispatcher<'a, B> {
    pub fn new(state: &'a mut ReplayState, backend: &'a mut B) -> Self {
        Self { state, backend }
    }
    fn apply_action(&mut self, action: Action) {
        let ReplayState {
            canvas,
            layers,
            users,
            active_user,
            follow_user_switch,
        } = &mut *self.state;
        let backend = &mut *self.backend;
        let user = *active_user;
        let UserState { tool, alpha } = users.get_or_insert(user);

        match action {
            Action::StrokePoint { x, y, pressure } => {
                let x = denormalize(x, canvas.width);
                let y = denormalize(y, canvas.height);
                match layers.get(tool.layer) {
                    Some(layer) => {
                        let target = StrokeTarget {
                            layer: layer.id(),
                            user,
                            tool: &*tool,
                            alpha: &mut *alpha,
                        };
                        if tool.is_drawing {
                            backend.continue_stroke(target, x, y, pressure);
                        } else {
                            backend.begin_stroke(target, x, y, pressure);
                        }
                    }
                    None => log::warn!(
                        "stroke point for user {user} targets missing layer {}",
                        tool.layer
                    ),
                }
                tool.record_point(x, y, pressure);
            }
            Action::StrokeEnd => {
                match layers.get(tool.layer) {
                    Some(layer) => {
                        backend.finalize_stroke(StrokeTarget {
                            layer: layer.id(),
                            user,
                            tool: &*tool,
                            alpha: &mut *alpha,
                        });
                    }
                    None => log::warn!(
                        "stroke end for user {user} targets missing layer {}",
                        tool.layer
                    ),
                }
                // An ended stroke never carries into the next one, committed or not.
                alpha.clear();
                tool.is_drawing = false;
            }
            Action::Layer { action, layer } => {
                let result = match action {
                    LayerAction::Set => {
                        tool.layer = layer;
                        Ok(())
                    }
                    LayerAction::Move => layers.move_layer(tool.layer, layer).map(|()| {
                        // The moved layer now lives at the destination.
                        tool.layer = layer;
                    }),
                    LayerAction::Clear => layers.clear(layer, backend),
                    LayerAction::Copy => layers.copy(tool.layer, layer, backend).map(|_| ()),
                };
                if let Err(e) = result {
                    log::warn!("skipping layer {} for user {user}: {e}", action.as_ref());
                }
            }
            Action::Color(color) => {
                tool.color = color;
                backend.refresh_brush(user, tool);
            }
            Action::FlipAndUser {
                mirror,
                user: new_user,
            } => {
                if let Some(mirror) = mirror {
                    layers.flip(mirror, backend);
                }
                if let Some(new_user) = new_user {
                    tool.user = new_user;
                    if *follow_user_switch && new_user != user {
                        log::debug!("active user {user} -> {new_user}");
                        *active_user = new_user;
                        users.get_or_insert(new_user);
                    }
                }
            }
            Action::Brush(brush) => {
                tool.apply_brush(brush, canvas.width);
                backend.refresh_brush(user, tool);
            }
            Action::Ignored(raw) => {
                log::trace!("ignoring unknown command kind {raw}");
            }
        }
    }
}
impl<B: RenderBackend> CommandConsumer<Command> for Dispatcher<'_, B> {
    fn apply(&mut self, command: &Command) {
        let action = command.action();
        log::trace!("dispatch {} {action:?}", action.name());
        self.apply_action(action);
    }
}
