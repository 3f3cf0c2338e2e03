//! A frame clock for driving playback without a windowing system.
//!
//! [`channel`] splits into a [`ChannelScheduler`] handed to the replay and a [`FrameLoop`] the host
//! runs. Each request queues one frame, and the loop ticks the replay once per queued frame, paced
//! by a [`crossbeam::channel::tick`] clock.

use crossbeam::channel::{Receiver, Sender, TryRecvError};
use redraw_core::{FrameScheduler, RenderBackend, Replay};

pub struct ChannelScheduler {
    requests: Sender<()>,
}
impl FrameScheduler for ChannelScheduler {
    fn request_frame(&mut self) {
        // The loop owns the receiver, if it's gone there's nobody to tick anyway.
        let _ = self.requests.send(());
    }
}

pub struct FrameLoop {
    requests: Receiver<()>,
    clock: Receiver<std::time::Instant>,
}
impl FrameLoop {
    /// Tick `replay` once per requested frame until it stops asking. Returns the frames run.
    pub fn run<B: RenderBackend>(&self, replay: &mut Replay<B>) -> usize {
        let mut frames = 0;
        loop {
            match self.requests.try_recv() {
                Ok(()) => (),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
            // Wait out the rest of this frame.
            let _ = self.clock.recv();
            replay.tick();
            frames += 1;
        }
        log::debug!("frame loop idle after {frames} frames");
        frames
    }
}

#[must_use]
pub fn channel(frame: std::time::Duration) -> (ChannelScheduler, FrameLoop) {
    let (requests, receiver) = crossbeam::channel::unbounded();
    (
        ChannelScheduler { requests },
        FrameLoop {
            requests: receiver,
            clock: crossbeam::channel::tick(frame),
        },
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use redraw_core::backend::recording::RecordingBackend;
    use redraw_core::{Command, ReplayConfig, Session, SessionHeader};

    #[test]
    fn plays_to_the_end() {
        let commands = vec![Command::draw(0.5, 0.5, 1.0); 450];
        let session = Session::new(SessionHeader::default(), commands);
        let mut replay =
            Replay::new(session, RecordingBackend::default(), &ReplayConfig::default()).unwrap();
        let (scheduler, frames) = channel(std::time::Duration::from_millis(1));
        replay.set_scheduler(scheduler);

        assert_eq!(frames.run(&mut replay), 0, "nothing requested yet");
        replay.play();
        assert_eq!(frames.run(&mut replay), 3);
        assert!(replay.is_at_end());
        assert!(!replay.is_playing());
    }
}
