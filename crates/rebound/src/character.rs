//! Paddle characters
//!
//! The arena always holds four characters, one per edge. Each is a bot
//! until a player registers it and becomes one again when that player
//! dies or the session resets. A character carries its own follow
//! camera so the in-game view can switch to any registered player.

use quartz_engine::foundation::math::{Vec3, Vec4};
use quartz_engine::render::primitives::Camera;
use quartz_engine::scene::SceneInstance;

use std::f32::consts::{FRAC_PI_2, PI};

/// Distance from the arena center to each home edge
pub const PLAYER_DISTANCE: f32 = 40.0;
/// Farthest a player may steer a paddle from the arena center
pub const PLAYER_MAX_MOVEMENT: f32 = 36.0;
/// Rest height of a character above the arena floor
pub const PLAYER_HEIGHT: f32 = 1.0;
/// Upward velocity applied by the registration hop
pub const HOP_VELOCITY: f32 = 8.0;

/// Vertical field of view shared by every camera in the game
pub const LENS_FOV: f32 = 0.2 * PI;
/// Near plane shared by every camera in the game
pub const LENS_NEAR: f32 = 0.01;
/// Far plane shared by every camera in the game
pub const LENS_FAR: f32 = 1000.0;

const GRAVITY: f32 = 20.0;
const CAMERA_BACK: f32 = 12.0;
const CAMERA_HEIGHT: f32 = 8.0;

/// Arena edge a character defends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeEdge {
    /// Negative z edge
    NegZ,
    /// Positive z edge
    PosZ,
    /// Negative x edge
    NegX,
    /// Positive x edge
    PosX,
}

impl HomeEdge {
    /// Unit vector from the arena center toward this edge
    pub fn outward(self) -> Vec3 {
        match self {
            Self::NegZ => Vec3::new(0.0, 0.0, -1.0),
            Self::PosZ => Vec3::new(0.0, 0.0, 1.0),
            Self::NegX => Vec3::new(-1.0, 0.0, 0.0),
            Self::PosX => Vec3::new(1.0, 0.0, 0.0),
        }
    }

    /// Roll applied to the paddle model so its hit box lines up with
    /// the edge
    pub fn roll(self) -> f32 {
        match self {
            Self::NegX => FRAC_PI_2,
            Self::PosX => -FRAC_PI_2,
            Self::NegZ | Self::PosZ => 0.0,
        }
    }

    /// Whether the edge runs along the x axis; characters on these
    /// edges move and intercept on z instead of x
    pub fn on_x_axis(self) -> bool {
        matches!(self, Self::NegX | Self::PosX)
    }
}

/// Fixed join-order palette
pub fn palette_color(index: usize) -> Vec4 {
    match index {
        0 => Vec4::new(0.3, 0.55, 1.0, 1.0),
        1 => Vec4::new(1.0, 0.2, 0.25, 1.0),
        2 => Vec4::new(1.0, 0.8, 0.22, 1.0),
        3 => Vec4::new(0.0, 0.5, 0.2, 1.0),
        _ => bot_color(),
    }
}

/// Gray worn by characters without a controlling player
pub fn bot_color() -> Vec4 {
    Vec4::new(0.5, 0.5, 0.5, 1.0)
}

/// One paddle in the arena
#[derive(Debug, Clone)]
pub struct Character {
    instance: SceneInstance,
    camera: Camera,
    home: HomeEdge,
    vertical_velocity: f32,
    npc: bool,
    player: Option<usize>,
}

impl Character {
    /// Create a character defending `home`, parked at the canonical
    /// start layout under bot control
    pub fn new(model: &str, home: HomeEdge, aspect: f32) -> Self {
        let camera = Camera::perspective(
            home.outward() * PLAYER_DISTANCE,
            LENS_FOV,
            aspect,
            LENS_NEAR,
            LENS_FAR,
        );
        let mut character = Self {
            instance: SceneInstance::new(model),
            camera,
            home,
            vertical_velocity: 0.0,
            npc: true,
            player: None,
        };
        character.reset();
        character
    }

    /// Return to the canonical start layout as an uncontrolled bot
    pub fn reset(&mut self) {
        let transform = &mut self.instance.transform;
        transform.translation =
            Vec3::new(0.0, PLAYER_HEIGHT, 0.0) + self.home.outward() * PLAYER_DISTANCE;
        transform.rotation = Vec3::new(0.0, 0.0, self.home.roll());
        self.vertical_velocity = 0.0;
        self.npc = true;
        self.player = None;
        self.instance.color = Some(bot_color());
        self.update_camera();
    }

    /// Hand control to a registered player
    pub fn assign_player(&mut self, player: usize, color: Vec4) {
        self.npc = false;
        self.player = Some(player);
        self.instance.color = Some(color);
    }

    /// Sever the player link and fall back to bot control
    pub fn make_bot(&mut self) {
        self.npc = true;
        self.player = None;
        self.instance.color = Some(bot_color());
    }

    /// Launch the registration hop
    pub fn hop(&mut self) {
        self.vertical_velocity = HOP_VELOCITY;
    }

    /// Player steering along the home edge, clamped to the arena
    pub fn slide(&mut self, amount: f32) {
        let next = (self.lateral_position() + amount)
            .clamp(-PLAYER_MAX_MOVEMENT, PLAYER_MAX_MOVEMENT);
        self.set_lateral_position(next);
    }

    /// Bot steering: jump straight to the ball's coordinate on our axis
    pub fn track(&mut self, ball_position: Vec3) {
        if self.orientation() {
            self.instance.transform.translation.z = ball_position.z;
        } else {
            self.instance.transform.translation.x = ball_position.x;
        }
    }

    /// Integrate the hop and keep the follow camera behind the paddle
    pub fn update(&mut self, delta_time: f32) {
        self.vertical_velocity -= GRAVITY * delta_time;
        let translation = &mut self.instance.transform.translation;
        translation.y += self.vertical_velocity * delta_time;
        if translation.y <= PLAYER_HEIGHT {
            translation.y = PLAYER_HEIGHT;
            self.vertical_velocity = 0.0;
        }
        self.update_camera();
    }

    fn update_camera(&mut self) {
        let position = self.instance.transform.translation
            + self.home.outward() * CAMERA_BACK
            + Vec3::new(0.0, CAMERA_HEIGHT, 0.0);
        self.camera.look_at(position, Vec3::zeros(), Vec3::y());
    }

    /// Refit the camera lens after a window resize
    pub fn set_lens(&mut self, aspect: f32) {
        self.camera.set_lens(LENS_FOV, aspect, LENS_NEAR, LENS_FAR);
    }

    /// Coordinate along the movement axis
    pub fn lateral_position(&self) -> f32 {
        if self.orientation() {
            self.instance.transform.translation.z
        } else {
            self.instance.transform.translation.x
        }
    }

    fn set_lateral_position(&mut self, value: f32) {
        if self.orientation() {
            self.instance.transform.translation.z = value;
        } else {
            self.instance.transform.translation.x = value;
        }
    }

    pub fn position(&self) -> Vec3 {
        self.instance.transform.translation
    }

    pub fn home(&self) -> HomeEdge {
        self.home
    }

    /// True for characters that move and intercept on the z axis
    pub fn orientation(&self) -> bool {
        self.home.on_x_axis()
    }

    pub fn npc(&self) -> bool {
        self.npc
    }

    pub fn player(&self) -> Option<usize> {
        self.player
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn instance(&self) -> &SceneInstance {
        &self.instance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_canonical_layout_per_edge() {
        let near = Character::new("paddle", HomeEdge::NegZ, 1.0);
        assert_relative_eq!(near.position().z, -PLAYER_DISTANCE);
        assert_relative_eq!(near.position().y, PLAYER_HEIGHT);
        assert!(!near.orientation());
        assert_relative_eq!(near.instance().transform.rotation.z, 0.0);

        let left = Character::new("paddle", HomeEdge::NegX, 1.0);
        assert_relative_eq!(left.position().x, -PLAYER_DISTANCE);
        assert!(left.orientation());
        assert_relative_eq!(left.instance().transform.rotation.z, FRAC_PI_2);

        let right = Character::new("paddle", HomeEdge::PosX, 1.0);
        assert_relative_eq!(right.instance().transform.rotation.z, -FRAC_PI_2);
        assert!(right.npc());
        assert_eq!(right.player(), None);
        assert_eq!(right.instance().color, Some(bot_color()));
    }

    #[test]
    fn test_hop_rises_then_settles_at_rest_height() {
        let mut character = Character::new("paddle", HomeEdge::NegZ, 1.0);
        character.hop();

        let mut peak = 0.0f32;
        for _ in 0..120 {
            character.update(DT);
            peak = peak.max(character.position().y);
        }

        assert!(peak > PLAYER_HEIGHT + 1.0, "hop never left the floor: {peak}");
        assert_relative_eq!(character.position().y, PLAYER_HEIGHT);

        // settled: further updates stay put
        character.update(DT);
        assert_relative_eq!(character.position().y, PLAYER_HEIGHT);
    }

    #[test]
    fn test_slide_clamps_to_arena() {
        let mut character = Character::new("paddle", HomeEdge::NegZ, 1.0);
        character.slide(100.0);
        assert_relative_eq!(character.lateral_position(), PLAYER_MAX_MOVEMENT);
        character.slide(-500.0);
        assert_relative_eq!(character.lateral_position(), -PLAYER_MAX_MOVEMENT);
        assert_relative_eq!(character.position().z, -PLAYER_DISTANCE);
    }

    #[test]
    fn test_track_moves_only_the_home_axis() {
        let ball = Vec3::new(7.0, PLAYER_HEIGHT, -3.0);

        let mut near = Character::new("paddle", HomeEdge::PosZ, 1.0);
        near.track(ball);
        assert_relative_eq!(near.position().x, 7.0);
        assert_relative_eq!(near.position().z, PLAYER_DISTANCE);

        let mut side = Character::new("paddle", HomeEdge::NegX, 1.0);
        side.track(ball);
        assert_relative_eq!(side.position().z, -3.0);
        assert_relative_eq!(side.position().x, -PLAYER_DISTANCE);
    }

    #[test]
    fn test_camera_follows_behind_the_home_edge() {
        let mut character = Character::new("paddle", HomeEdge::NegZ, 1.0);
        character.slide(5.0);
        character.update(DT);

        let camera = character.camera();
        assert_relative_eq!(camera.position.x, 5.0);
        assert_relative_eq!(camera.position.z, -PLAYER_DISTANCE - CAMERA_BACK);
        assert_relative_eq!(camera.position.y, PLAYER_HEIGHT + CAMERA_HEIGHT);
        assert_relative_eq!(camera.target, Vec3::zeros());
    }

    #[test]
    fn test_control_handoff_recolors() {
        let mut character = Character::new("paddle", HomeEdge::PosZ, 1.0);
        character.assign_player(1, palette_color(1));
        assert!(!character.npc());
        assert_eq!(character.player(), Some(1));
        assert_eq!(character.instance().color, Some(palette_color(1)));

        character.make_bot();
        assert!(character.npc());
        assert_eq!(character.player(), None);
        assert_eq!(character.instance().color, Some(bot_color()));
    }
}
