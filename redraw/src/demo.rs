//! A synthesized session, standing in for a parsed capture.

use redraw_core::brush::{BrushControl, BrushSettings, BrushType, Flip};
use redraw_core::color::Color;
use redraw_core::commands::{Command, LayerAction};
use redraw_core::{Session, SessionHeader, UserID};

/// Points per synthesized stroke.
const STROKE_POINTS: usize = 48;

fn wave(commands: &mut Vec<Command>, row: f32, phase: f32, amplitude: f32) {
    for i in 0..STROKE_POINTS {
        let t = i as f32 / (STROKE_POINTS - 1) as f32;
        let x = 0.1 + 0.8 * t;
        let y = row + amplitude * (t * std::f32::consts::TAU + phase).sin();
        // Taper in and out.
        let pressure = (t * std::f32::consts::PI).sin().max(0.05);
        commands.push(Command::draw(x, y.clamp(0.0, 1.0), pressure));
    }
    commands.push(Command::draw_end());
}

fn switch_user(commands: &mut Vec<Command>, user: UserID) {
    commands.push(Command::flip(Flip::empty(), Some(user)));
}

/// Two users sketching on a 4:3 canvas, with every kind of command mixed in.
#[must_use]
pub fn session() -> Session {
    let mut commands = Vec::new();
    let palette = [
        Color::from_rgb8(0x22, 0x2e, 0x50),
        Color::from_rgb8(0xe0, 0x7a, 0x5f),
        Color::from_rgb8(0x3d, 0x9a, 0x8b),
        Color::from_rgb8(0xf2, 0xcc, 0x8f),
    ];

    // Background wash on the bottom layer.
    commands.push(Command::layer(LayerAction::Set, 4));
    commands.push(Command::brush(BrushSettings {
        radius: 0.04,
        control: BrushControl::empty(),
        ty: BrushType::Soft,
        opacity: 0.6,
    }));
    commands.push(Command::color(palette[3]));
    for row in 0..8u8 {
        wave(&mut commands, 0.1 + f32::from(row) * 0.11, 0.0, 0.01);
    }

    // Line work, alternating users.
    commands.push(Command::layer(LayerAction::Set, 1));
    for (i, color) in palette.iter().take(3).enumerate() {
        let user = (i % 2) as UserID;
        switch_user(&mut commands, user);
        commands.push(Command::color(*color));
        commands.push(Command::brush(BrushSettings {
            radius: 0.006 + 0.002 * i as f32,
            control: BrushControl::PRESSURE_SIZE | BrushControl::PRESSURE_OPACITY,
            ..Default::default()
        }));
        for stroke in 0..4u8 {
            let phase = f32::from(stroke) * 0.7 + i as f32;
            wave(&mut commands, 0.2 + f32::from(stroke) * 0.18, phase, 0.06);
        }
    }

    // Duplicate the line work beneath, then clear and redo part of it.
    commands.push(Command::layer(LayerAction::Copy, 3));
    commands.push(Command::layer(LayerAction::Move, 0));
    commands.push(Command::flip(Flip::HORIZONTAL, None));
    commands.push(Command::layer(LayerAction::Set, 2));
    commands.push(Command::color(palette[0]));
    wave(&mut commands, 0.5, 1.0, 0.2);
    commands.push(Command::layer(LayerAction::Clear, 2));
    commands.push(Command::brush(BrushSettings {
        radius: 0.02,
        ty: BrushType::Eraser,
        ..Default::default()
    }));
    commands.push(Command::layer(LayerAction::Set, 0));
    wave(&mut commands, 0.5, 0.0, 0.0);
    commands.push(Command::flip(Flip::VERTICAL, None));
    // A kind from a newer capture format.
    commands.push(Command::unknown(7));

    Session::new(
        SessionHeader {
            aspect_ratio: 4.0 / 3.0,
            title: Some("demo".to_owned()),
        },
        commands,
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use redraw_core::commands::Action;
    #[test]
    fn covers_every_action() {
        let session = session();
        let names: hashbrown::HashSet<_> = session
            .iter()
            .map(|command| command.action().name())
            .collect();
        for action in [
            Action::StrokeEnd,
            Action::Ignored(0),
            Action::StrokePoint {
                x: 0.0,
                y: 0.0,
                pressure: 0.0,
            },
            Action::Brush(BrushSettings::default()),
            Action::Color(Color::default()),
            Action::FlipAndUser {
                mirror: None,
                user: None,
            },
            Action::Layer {
                action: LayerAction::Set,
                layer: 0,
            },
        ] {
            assert!(names.contains(action.name()), "missing {}", action.name());
        }
    }
}
