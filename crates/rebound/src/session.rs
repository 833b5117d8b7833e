//! Game session state machine
//!
//! Drives one frame of game logic per engine tick: registration with
//! the orbiting intro camera, the match itself, and the end screen
//! countdown. Regardless of state, the directional light rotates and
//! the shadow matrices are rebuilt every frame.

use crate::ball::Ball;
use crate::character::{palette_color, Character, HomeEdge, LENS_FAR, LENS_FOV, LENS_NEAR};
use crate::config::GameplayConfig;
use crate::player::Player;

use quartz_engine::foundation::math::Vec3;
use quartz_engine::input::{Axis, Button, InputState, MAX_SLOTS};
use quartz_engine::render::api::FillMode;
use quartz_engine::render::lighting::{DirectionalLight, LightRig};
use quartz_engine::render::passes::shadow::{SceneBounds, ShadowFrame};
use quartz_engine::render::primitives::Camera;
use quartz_engine::render::RenderError;
use quartz_engine::scene::SceneInstance;

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f32::consts::TAU;

/// Orbit radius of the registration camera
const INTRO_RADIUS: f32 = 80.0;
/// Height of the registration camera above the floor
const INTRO_HEIGHT: f32 = 35.0;
/// Orbit speed of the registration camera in revolutions per second
const INTRO_SPEED: f32 = 0.025;
/// Characters in the arena, and so the registration cap
const MAX_PLAYERS: usize = 4;

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for players to join; the scene renders blurred
    Registration,
    /// The match is running
    InGame,
    /// Holding the final frame before the session resets
    EndScreen,
}

/// One complete game session
///
/// Owns the four characters, the ball, the level statics, and the
/// per-frame lighting state. The engine forwards input and delta time;
/// the render side reads cameras, instances, and blur strength back.
pub struct GameSession {
    state: SessionState,
    players: Vec<Player>,
    characters: [Character; 4],
    ball: Ball,
    statics: Vec<SceneInstance>,
    intro_camera: Camera,
    intro_time: f32,
    end_timer: f32,
    blur_iterations: u32,
    fill_mode: FillMode,
    light_rig: LightRig,
    bounds: SceneBounds,
    shadow: ShadowFrame,
    exit_requested: bool,
    gameplay: GameplayConfig,
    rng: StdRng,
}

impl GameSession {
    /// Build a session around the loaded level statics
    pub fn new(
        gameplay: GameplayConfig,
        statics: Vec<SceneInstance>,
        aspect: f32,
    ) -> Result<Self, RenderError> {
        Self::with_rng(gameplay, statics, aspect, StdRng::from_entropy())
    }

    fn with_rng(
        gameplay: GameplayConfig,
        statics: Vec<SceneInstance>,
        aspect: f32,
        mut rng: StdRng,
    ) -> Result<Self, RenderError> {
        let characters = [
            Character::new("paddle", HomeEdge::NegZ, aspect),
            Character::new("paddle", HomeEdge::PosZ, aspect),
            Character::new("paddle", HomeEdge::NegX, aspect),
            Character::new("paddle", HomeEdge::PosX, aspect),
        ];
        let ball = Ball::new("ball", gameplay.ball_speed, &mut rng);

        let intro_camera = Camera::perspective(
            Vec3::new(INTRO_RADIUS, INTRO_HEIGHT, 0.0),
            LENS_FOV,
            aspect,
            LENS_NEAR,
            LENS_FAR,
        );

        let bounds = SceneBounds::new(Vec3::zeros(), 4000.0f32.sqrt())?;
        let light_rig = LightRig::default();
        let shadow = ShadowFrame::compute(&bounds, light_rig.direction())?;

        Ok(Self {
            state: SessionState::Registration,
            players: Vec::new(),
            characters,
            ball,
            statics,
            intro_camera,
            intro_time: 0.0,
            end_timer: 0.0,
            blur_iterations: 1,
            fill_mode: FillMode::Solid,
            light_rig,
            bounds,
            shadow,
            exit_requested: false,
            gameplay,
            rng,
        })
    }

    /// Advance the session by one frame
    pub fn update(&mut self, input: &InputState, delta_time: f32) -> Result<(), RenderError> {
        // exit always possible
        if input.just_released(0, Button::Back) {
            self.exit_requested = true;
        }

        match self.state {
            SessionState::Registration => self.update_registration(input, delta_time),
            SessionState::InGame => self.update_ingame(input, delta_time),
            SessionState::EndScreen => self.update_end_screen(delta_time),
        }

        self.light_rig.update(delta_time);
        self.shadow = ShadowFrame::compute(&self.bounds, self.light_rig.direction())?;
        Ok(())
    }

    fn update_registration(&mut self, input: &InputState, delta_time: f32) {
        self.intro_time += delta_time;
        let angle = TAU * self.intro_time * INTRO_SPEED;
        let position = Vec3::new(
            INTRO_RADIUS * angle.cos(),
            INTRO_HEIGHT,
            INTRO_RADIUS * angle.sin(),
        );
        self.intro_camera.look_at(position, Vec3::zeros(), Vec3::y());

        // first player presses start to begin the match
        if let Some(first) = self.players.first() {
            if input.just_pressed(first.slot, Button::Start) {
                self.blur_iterations = 0;
                self.state = SessionState::InGame;
                info!("Match started with {} players", self.players.len());
            }
        }

        // debug
        if input.just_pressed(0, Button::Y) {
            self.fill_mode = match self.fill_mode {
                FillMode::Solid => FillMode::Wireframe,
                FillMode::Wireframe => FillMode::Solid,
            };
        }

        // up to four players can join, one per frame
        for slot in 0..MAX_SLOTS {
            if self.players.len() == MAX_PLAYERS {
                break;
            }
            if self.players.iter().any(|p| p.slot == slot) {
                continue;
            }
            if input.just_pressed(slot, Button::A) {
                let index = self.players.len();
                self.players
                    .push(Player::new(slot, index, self.gameplay.player_health));
                self.characters[index].assign_player(index, palette_color(index));
                self.characters[index].hop();
                info!("Player {} registered to input slot {}", index + 1, slot);
                break;
            }
        }

        for character in &mut self.characters {
            character.update(delta_time);
        }
    }

    fn update_ingame(&mut self, input: &InputState, delta_time: f32) {
        // bots act on where the ball is now, before it moves this frame
        let ball_position = self.ball.position();

        for player in &self.players {
            let character = &mut self.characters[player.character];
            if character.npc() {
                continue;
            }
            let stick = input.axis(player.slot, Axis::LeftStickX);
            character.slide(stick * self.gameplay.player_speed * delta_time);
            character.update(delta_time);
        }

        for character in &mut self.characters {
            if !character.npc() {
                continue;
            }
            character.track(ball_position);
            character.update(delta_time);
        }

        // the ball moves strictly after every character
        if let Some(edge) = self.ball.update(delta_time, &self.characters) {
            self.score_escape(edge);
            self.ball.reset(&mut self.rng);
        }

        let mut all_dead = true;
        for character in &mut self.characters {
            let Some(player_index) = character.player() else {
                continue;
            };
            if self.players[player_index].is_alive() {
                all_dead = false;
            } else {
                info!("Player {} has died", player_index + 1);
                character.make_bot();
            }
        }

        if all_dead {
            info!("Everyone is dead");
            self.state = SessionState::EndScreen;
        }
    }

    fn update_end_screen(&mut self, delta_time: f32) {
        self.end_timer += delta_time;
        if self.end_timer >= self.gameplay.end_screen_duration {
            self.reset();
            self.state = SessionState::Registration;
        }
    }

    fn score_escape(&mut self, edge: HomeEdge) {
        let Some(index) = self.characters.iter().position(|c| c.home() == edge) else {
            return;
        };
        let Some(player_index) = self.characters[index].player() else {
            return;
        };
        let player = &mut self.players[player_index];
        player.health -= 1;
        info!(
            "Player {} conceded; {} health remaining",
            player_index + 1,
            player.health
        );
    }

    /// Clear registration and put the arena back in its start layout
    fn reset(&mut self) {
        self.players.clear();
        for character in &mut self.characters {
            character.reset();
        }
        self.ball.reset(&mut self.rng);
        self.blur_iterations = 1;
        self.end_timer = 0.0;
    }

    /// Refit every camera lens after a window resize
    pub fn set_aspect(&mut self, aspect: f32) {
        self.intro_camera
            .set_lens(LENS_FOV, aspect, LENS_NEAR, LENS_FAR);
        for character in &mut self.characters {
            character.set_lens(aspect);
        }
    }

    /// Camera the frame renders through
    ///
    /// In game this follows the first registered player, even with four
    /// players in the match; elsewhere the intro camera.
    pub fn active_camera(&self) -> &Camera {
        match self.state {
            SessionState::InGame => self
                .players
                .first()
                .map_or(&self.intro_camera, |p| self.characters[p.character].camera()),
            SessionState::Registration | SessionState::EndScreen => &self.intro_camera,
        }
    }

    /// Append the frame's draw list: statics, then the ball, then the
    /// characters
    pub fn collect_instances(&self, out: &mut Vec<SceneInstance>) {
        out.extend(self.statics.iter().cloned());
        out.push(self.ball.instance().clone());
        for character in &self.characters {
            out.push(character.instance().clone());
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn blur_iterations(&self) -> u32 {
        self.blur_iterations
    }

    pub fn fill_mode(&self) -> FillMode {
        self.fill_mode
    }

    pub fn light(&self) -> &DirectionalLight {
        self.light_rig.light()
    }

    pub fn shadow_frame(&self) -> ShadowFrame {
        self.shadow
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn ball_position(&self) -> Vec3 {
        self.ball.position()
    }

    pub fn characters(&self) -> &[Character; 4] {
        &self.characters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{bot_color, PLAYER_DISTANCE, PLAYER_HEIGHT};
    use approx::assert_relative_eq;
    use quartz_engine::input::{ScriptedInput, SlotSample};
    use std::f32::consts::FRAC_PI_2;

    const DT: f32 = 1.0 / 60.0;

    struct Harness {
        session: GameSession,
        input: InputState,
        source: ScriptedInput,
    }

    impl Harness {
        fn new() -> Self {
            let session = GameSession::with_rng(
                GameplayConfig::default(),
                Vec::new(),
                16.0 / 9.0,
                StdRng::seed_from_u64(99),
            )
            .unwrap();
            Self {
                session,
                input: InputState::new(),
                source: ScriptedInput::empty(),
            }
        }

        fn step(&mut self) {
            self.input.update(&mut self.source);
            self.session.update(&self.input, DT).unwrap();
        }

        fn press(&mut self, slot: usize, button: Button) {
            self.source
                .push_slot(slot, SlotSample::connected().with_button(button));
            self.source.push_slot(slot, SlotSample::connected());
            self.step();
            self.step();
        }

        fn join(&mut self, slot: usize) {
            self.press(slot, Button::A);
        }

        fn start_match(&mut self) {
            let slot = self.session.players[0].slot;
            self.press(slot, Button::Start);
        }
    }

    #[test]
    fn test_join_assigns_character_color_and_hop() {
        let mut h = Harness::new();
        h.join(2);

        assert_eq!(h.session.player_count(), 1);
        assert_eq!(h.session.players[0].slot, 2);
        assert_eq!(h.session.players[0].character, 0);
        assert_eq!(h.session.players[0].health, 3);

        let character = &h.session.characters[0];
        assert!(!character.npc());
        assert_eq!(character.player(), Some(0));
        assert_eq!(character.instance().color, Some(palette_color(0)));
        assert!(character.position().y > PLAYER_HEIGHT, "join hop missing");
    }

    #[test]
    fn test_slot_joins_only_once() {
        let mut h = Harness::new();
        h.join(0);
        h.join(0);
        assert_eq!(h.session.player_count(), 1);
    }

    #[test]
    fn test_registration_caps_at_four_players() {
        let mut h = Harness::new();
        for slot in 0..MAX_SLOTS {
            h.join(slot);
        }
        assert_eq!(h.session.player_count(), 4);
        assert!(h.session.players.iter().all(|p| p.slot != 4));
        assert_eq!(
            h.session.characters[3].instance().color,
            Some(palette_color(3))
        );
    }

    #[test]
    fn test_start_needs_a_registered_player() {
        let mut h = Harness::new();
        h.press(0, Button::Start);
        assert_eq!(h.session.state(), SessionState::Registration);

        h.join(0);
        assert_eq!(h.session.blur_iterations(), 1);
        h.start_match();
        assert_eq!(h.session.state(), SessionState::InGame);
        assert_eq!(h.session.blur_iterations(), 0);
    }

    #[test]
    fn test_start_listens_to_the_first_player_only() {
        let mut h = Harness::new();
        h.join(3);
        h.join(0);

        h.press(0, Button::Start);
        assert_eq!(h.session.state(), SessionState::Registration);

        h.press(3, Button::Start);
        assert_eq!(h.session.state(), SessionState::InGame);
    }

    #[test]
    fn test_joins_on_the_start_frame_still_count() {
        let mut h = Harness::new();
        h.join(0);

        let mut frame = [SlotSample::default(); MAX_SLOTS];
        frame[0] = SlotSample::connected().with_button(Button::Start);
        frame[1] = SlotSample::connected().with_button(Button::A);
        h.source.push_frame(frame);
        h.step();

        assert_eq!(h.session.state(), SessionState::InGame);
        assert_eq!(h.session.player_count(), 2);
    }

    #[test]
    fn test_wireframe_toggle_on_slot_zero() {
        let mut h = Harness::new();
        assert_eq!(h.session.fill_mode(), FillMode::Solid);
        h.press(0, Button::Y);
        assert_eq!(h.session.fill_mode(), FillMode::Wireframe);
        h.press(0, Button::Y);
        assert_eq!(h.session.fill_mode(), FillMode::Solid);
    }

    #[test]
    fn test_back_release_requests_exit_in_any_state() {
        let mut h = Harness::new();
        h.source
            .push_slot(0, SlotSample::connected().with_button(Button::Back));
        h.step();
        assert!(!h.session.exit_requested(), "fired on press, not release");
        h.source.push_slot(0, SlotSample::connected());
        h.step();
        assert!(h.session.exit_requested());

        let mut ingame = Harness::new();
        ingame.join(0);
        ingame.start_match();
        ingame.press(0, Button::Back);
        assert!(ingame.session.exit_requested());
    }

    #[test]
    fn test_escape_scores_against_the_owning_player() {
        let mut h = Harness::new();
        h.join(0);
        h.start_match();

        // aim past the owner's edge, outside every paddle
        h.session.ball.place(
            Vec3::new(10.0, PLAYER_HEIGHT, -43.9),
            Vec3::new(0.0, 0.0, -1.0),
        );
        h.step();

        assert_eq!(h.session.players[0].health, 2);
        assert_relative_eq!(
            h.session.ball_position().y,
            PLAYER_HEIGHT,
            epsilon = 1.0e-6
        );
        assert!(h.session.ball_position().x.abs() < 1.0, "ball not reserved");
    }

    #[test]
    fn test_escape_past_a_bot_edge_only_resets() {
        let mut h = Harness::new();
        h.join(0);
        h.start_match();

        h.session.ball.place(
            Vec3::new(10.0, PLAYER_HEIGHT, 43.9),
            Vec3::new(0.0, 0.0, 1.0),
        );
        h.step();

        assert_eq!(h.session.players[0].health, 3);
        assert!(h.session.ball_position().z.abs() < 1.0);
    }

    #[test]
    fn test_dead_player_becomes_bot_and_last_death_ends_the_match() {
        let mut h = Harness::new();
        h.join(0);
        h.join(1);
        h.start_match();
        h.step();

        h.session.players[0].health = 0;
        h.step();
        assert!(h.session.characters[0].npc());
        assert_eq!(h.session.characters[0].player(), None);
        assert_eq!(h.session.characters[0].instance().color, Some(bot_color()));
        assert_eq!(h.session.state(), SessionState::InGame);

        h.session.players[1].health = 0;
        h.step();
        assert_eq!(h.session.state(), SessionState::EndScreen);
    }

    #[test]
    fn test_end_screen_resets_to_the_canonical_layout() {
        let mut h = Harness::new();
        h.join(0);
        h.start_match();
        h.session.players[0].health = 0;
        h.step();
        assert_eq!(h.session.state(), SessionState::EndScreen);

        for _ in 0..290 {
            h.step();
        }
        assert_eq!(h.session.state(), SessionState::EndScreen);

        for _ in 0..15 {
            h.step();
        }
        assert_eq!(h.session.state(), SessionState::Registration);
        assert_eq!(h.session.player_count(), 0);
        assert_eq!(h.session.blur_iterations(), 1);

        let characters = h.session.characters();
        assert_relative_eq!(characters[0].position().z, -PLAYER_DISTANCE);
        assert_relative_eq!(characters[1].position().z, PLAYER_DISTANCE);
        assert_relative_eq!(characters[2].position().x, -PLAYER_DISTANCE);
        assert_relative_eq!(characters[3].position().x, PLAYER_DISTANCE);
        assert_relative_eq!(
            characters[2].instance().transform.rotation.z,
            FRAC_PI_2
        );
        assert_relative_eq!(
            characters[3].instance().transform.rotation.z,
            -FRAC_PI_2
        );
        assert!(characters[2].orientation());
        assert!(characters[3].orientation());
        for character in characters {
            assert!(character.npc());
            assert_eq!(character.instance().color, Some(bot_color()));
        }
        assert_relative_eq!(
            h.session.ball_position(),
            Vec3::new(0.0, PLAYER_HEIGHT, 0.0),
            epsilon = 1.0e-6
        );
    }

    #[test]
    fn test_bots_track_the_previous_frame_ball() {
        let mut h = Harness::new();
        h.join(0);
        h.start_match();

        h.step();
        let seen = h.session.ball_position();
        h.step();

        // character 1 covers x, characters 2 and 3 cover z
        assert_relative_eq!(h.session.characters[1].position().x, seen.x);
        assert_relative_eq!(h.session.characters[2].position().z, seen.z);
        assert_relative_eq!(h.session.characters[3].position().z, seen.z);
        assert!(h.session.ball_position() != seen, "ball never moved");
    }

    #[test]
    fn test_player_movement_clamps_and_uses_the_stick() {
        let mut h = Harness::new();
        h.join(0);
        h.start_match();

        let held = SlotSample::connected().with_axis(Axis::LeftStickX, 1.0);
        for _ in 0..120 {
            h.source.push_slot(0, held);
            h.step();
        }
        assert_relative_eq!(
            h.session.characters[0].lateral_position(),
            crate::character::PLAYER_MAX_MOVEMENT
        );
    }

    #[test]
    fn test_intro_camera_orbits_during_registration() {
        let mut h = Harness::new();
        h.step();
        let first = h.session.active_camera().position;
        for _ in 0..30 {
            h.step();
        }
        let later = h.session.active_camera().position;

        assert!(first != later, "intro camera froze");
        assert_relative_eq!(later.y, INTRO_HEIGHT);
        assert_relative_eq!(
            (later.x * later.x + later.z * later.z).sqrt(),
            INTRO_RADIUS,
            epsilon = 1.0e-3
        );
    }

    #[test]
    fn test_ingame_camera_follows_the_first_player() {
        let mut h = Harness::new();
        h.join(1);
        h.join(0);
        h.start_match();
        h.step();

        let expected = h.session.characters[0].camera().position;
        assert_relative_eq!(h.session.active_camera().position, expected);
        // first player's character sits on the negative z edge
        assert!(expected.z < -PLAYER_DISTANCE);
    }

    #[test]
    fn test_light_and_shadow_refresh_every_frame() {
        let mut h = Harness::new();
        let direction = h.session.light().direction;
        let transform = h.session.shadow_frame().transform();

        h.step();

        let after = h.session.light().direction;
        assert!(direction != after, "light never rotated");
        assert_relative_eq!(after.norm(), direction.norm(), epsilon = 1.0e-5);
        assert!(h.session.shadow_frame().transform() != transform);
    }
}
