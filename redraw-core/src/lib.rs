pub mod backend;
pub mod brush;
pub mod color;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod id;
pub mod playback;
pub mod session;
pub mod state;
pub mod util;

pub use backend::{CopyMode, RenderBackend, StrokeTarget};
pub use commands::{Command, UserID};
pub use config::ReplayConfig;
pub use playback::{FrameScheduler, Replay, ReplayError};
pub use session::{Session, SessionHeader};
