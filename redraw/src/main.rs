#![warn(clippy::pedantic)]

pub mod config;
pub mod demo;
pub mod frames;
pub mod raster;

use anyhow::Result as AnyResult;
use redraw_core::Replay;

/// Roughly 60 frames per second.
const FRAME: std::time::Duration = std::time::Duration::from_micros(16_667);

fn main() -> AnyResult<()> {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    // Log to a terminal, if available. Else, log to "log.out" in the working directory.
    if has_term {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        let _ = simple_logging::log_to_file("log.out", log::LevelFilter::Debug);
    }

    let settings = config::Settings::load();
    if settings.did_fail_to_load() {
        if let Err(err) = settings.save() {
            log::warn!("could not write default settings: {err}");
        }
    }

    let mut replay = Replay::new(
        demo::session(),
        raster::SoftwareBackend::default(),
        &settings.replay,
    )?;
    let (scheduler, frame_loop) = frames::channel(FRAME);
    replay.set_scheduler(scheduler);
    let len = replay.len();
    replay.on_update(move |cursor| {
        log::trace!("at {cursor:?} of {len}");
    });

    let started = std::time::Instant::now();
    replay.play();
    let frames = frame_loop.run(&mut replay);
    log::info!(
        "played {} commands in {frames} frames, {:?}",
        replay.len(),
        started.elapsed()
    );

    // Scrub back and forth. Backward seeks replay from the start.
    let started = std::time::Instant::now();
    replay.seek_start();
    replay.seek(az::saturating_cast::<usize, isize>(replay.len() / 2));
    replay.seek_end();
    log::info!(
        "scrubbed in {:?}, {} layer resets so far",
        started.elapsed(),
        replay.backend().replays()
    );

    let half = replay.canvas().width / 2;
    replay.set_canvas_width(half);

    let flat = replay.backend().flatten(replay.layers().iter());
    log::info!(
        "final {}x{} image, {:.1}% painted, {} users",
        flat.width(),
        flat.height(),
        flat.coverage() * 100.0,
        replay.users().len(),
    );
    Ok(())
}
