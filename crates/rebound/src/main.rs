//! Rebound: a four-player arena ball game
//!
//! Four paddles guard the edges of a square arena while a ball
//! ricochets between them. Players join from gamepad slots during the
//! registration intro; paddles nobody claims are driven by bots. The
//! binary runs a scripted demo session against the headless render
//! device, which exercises the full frame pipeline without a GPU.

mod ball;
mod character;
mod config;
mod game;
mod level;
mod player;
mod session;

use crate::config::GameConfig;
use crate::game::ReboundGame;

use quartz_engine::config::Config;
use quartz_engine::input::{Axis, Button, ScriptedInput, SlotSample, MAX_SLOTS};
use quartz_engine::render::backends::HeadlessDevice;
use quartz_engine::Engine;

const CONFIG_PATH: &str = "config/rebound.toml";

fn main() {
    quartz_engine::foundation::logging::init();
    if let Err(e) = run() {
        eprintln!("Application error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = GameConfig::load_or_default(CONFIG_PATH)?;
    log::info!(
        "Starting {} at {}x{}",
        config.engine.window.title,
        config.engine.window.width,
        config.engine.window.height
    );

    let engine_config = config.engine.clone();
    let device = HeadlessDevice::new(engine_config.window.width, engine_config.window.height);
    let mut game = ReboundGame::new(config);
    Engine::run(
        engine_config,
        Box::new(device),
        Box::new(demo_script()),
        &mut game,
    )?;
    Ok(())
}

/// Canned gamepad recording for the demo session
///
/// Two pads join during registration, the first one starts the match,
/// both sway their paddles through a rally, and the first pad finally
/// backs out so the run terminates.
fn demo_script() -> ScriptedInput {
    let mut script = ScriptedInput::empty();

    // Let the intro camera orbit for a bit.
    for _ in 0..240 {
        script.push_slot(0, SlotSample::connected());
    }

    // Peek at the wireframe toggle.
    script.push_slot(0, SlotSample::connected().with_button(Button::Y));
    script.push_slot(0, SlotSample::connected());
    script.push_slot(0, SlotSample::connected().with_button(Button::Y));
    script.push_slot(0, SlotSample::connected());

    // Two pads join, then the first one starts the match.
    script.push_frame(two_pads(
        SlotSample::connected().with_button(Button::A),
        SlotSample::connected(),
    ));
    script.push_frame(two_pads(SlotSample::connected(), SlotSample::connected()));
    script.push_frame(two_pads(
        SlotSample::connected(),
        SlotSample::connected().with_button(Button::A),
    ));
    script.push_frame(two_pads(SlotSample::connected(), SlotSample::connected()));
    script.push_frame(two_pads(
        SlotSample::connected().with_button(Button::Start),
        SlotSample::connected(),
    ));
    script.push_frame(two_pads(SlotSample::connected(), SlotSample::connected()));

    // Rally for a while, both players swaying side to side.
    for i in 0..900u32 {
        let sway = if (i / 90) % 2 == 0 { 0.8 } else { -0.8 };
        script.push_frame(two_pads(
            SlotSample::connected().with_axis(Axis::LeftStickX, sway),
            SlotSample::connected().with_axis(Axis::LeftStickX, -sway),
        ));
    }

    // Back out so the loop ends.
    script.push_frame(two_pads(
        SlotSample::connected().with_button(Button::Back),
        SlotSample::connected(),
    ));
    script.push_frame(two_pads(SlotSample::connected(), SlotSample::connected()));
    script
}

fn two_pads(first: SlotSample, second: SlotSample) -> [SlotSample; MAX_SLOTS] {
    let mut frame = [SlotSample::default(); MAX_SLOTS];
    frame[0] = first;
    frame[1] = second;
    frame
}
