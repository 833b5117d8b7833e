//! The shared play ball
//!
//! One ball travels the arena on the floor plane. It bounces off any
//! paddle it reaches and reports the edge it escapes over so the
//! session can score the loss and serve again.

use crate::character::{Character, HomeEdge, PLAYER_DISTANCE, PLAYER_HEIGHT};

use quartz_engine::foundation::math::{Vec3, Vec4};
use quartz_engine::render::technique::ShaderKind;
use quartz_engine::scene::SceneInstance;

use rand::Rng;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

/// Half extent of a paddle along its long axis
const PADDLE_HALF_LENGTH: f32 = 4.0;
/// Half extent of a paddle across its short axis
const PADDLE_HALF_DEPTH: f32 = 0.75;
/// Radius of the ball model
const BALL_RADIUS: f32 = 0.5;
/// Coordinate of the paddle face the ball bounces off
const REFLECT_DISTANCE: f32 = PLAYER_DISTANCE - PADDLE_HALF_DEPTH - BALL_RADIUS;
/// Past this coordinate a paddle can no longer reach the ball
const REFLECT_LIMIT: f32 = PLAYER_DISTANCE + BALL_RADIUS;
/// Coordinate past which the ball has left the arena
pub const ESCAPE_DISTANCE: f32 = PLAYER_DISTANCE + 4.0;
/// Maximum deviation of a serve from the quadrant diagonals, in radians
const SERVE_JITTER: f32 = 0.4;

/// The arena ball
#[derive(Debug, Clone)]
pub struct Ball {
    instance: SceneInstance,
    direction: Vec3,
    speed: f32,
}

impl Ball {
    /// Create the ball at the arena center with a random serve
    pub fn new(model: &str, speed: f32, rng: &mut impl Rng) -> Self {
        let mut instance = SceneInstance::new(model).with_shader(ShaderKind::BasicUntextured);
        instance.color = Some(Vec4::new(1.0, 0.45, 0.1, 1.0));
        let mut ball = Self {
            instance,
            direction: Vec3::x(),
            speed,
        };
        ball.reset(rng);
        ball
    }

    /// Recenter the ball and serve in a fresh random direction
    ///
    /// Serves aim near the quadrant diagonals so the ball always makes
    /// progress toward two edges at once.
    pub fn reset(&mut self, rng: &mut impl Rng) {
        self.instance.transform.translation = Vec3::new(0.0, PLAYER_HEIGHT, 0.0);
        let quadrant = f32::from(rng.gen_range(0u8..4));
        let angle = FRAC_PI_4 + quadrant * FRAC_PI_2 + rng.gen_range(-SERVE_JITTER..SERVE_JITTER);
        self.direction = Vec3::new(angle.cos(), 0.0, angle.sin());
    }

    /// Advance the ball and bounce it off paddles
    ///
    /// Returns the home edge the ball escaped over, if any; the caller
    /// owns the scoring and the reserve.
    pub fn update(&mut self, delta_time: f32, characters: &[Character; 4]) -> Option<HomeEdge> {
        self.instance.transform.translation += self.direction * self.speed * delta_time;
        for character in characters {
            self.reflect_off(character);
        }
        self.escaped_edge()
    }

    fn reflect_off(&mut self, character: &Character) {
        let outward = character.home().outward();
        let heading = self.direction.dot(&outward);
        if heading <= 0.0 {
            return;
        }

        let along = self.instance.transform.translation.dot(&outward);
        if !(REFLECT_DISTANCE..=REFLECT_LIMIT).contains(&along) {
            return;
        }

        let offset = if character.orientation() {
            self.instance.transform.translation.z - character.position().z
        } else {
            self.instance.transform.translation.x - character.position().x
        };
        if offset.abs() > PADDLE_HALF_LENGTH {
            return;
        }

        self.direction -= outward * (2.0 * heading);
        // settle on the paddle face so the bounce is never applied twice
        self.instance.transform.translation += outward * (REFLECT_DISTANCE - along);
    }

    fn escaped_edge(&self) -> Option<HomeEdge> {
        let translation = self.instance.transform.translation;
        if translation.z < -ESCAPE_DISTANCE {
            Some(HomeEdge::NegZ)
        } else if translation.z > ESCAPE_DISTANCE {
            Some(HomeEdge::PosZ)
        } else if translation.x < -ESCAPE_DISTANCE {
            Some(HomeEdge::NegX)
        } else if translation.x > ESCAPE_DISTANCE {
            Some(HomeEdge::PosX)
        } else {
            None
        }
    }

    pub fn position(&self) -> Vec3 {
        self.instance.transform.translation
    }

    pub fn instance(&self) -> &SceneInstance {
        &self.instance
    }

    /// Pin the ball to a position and heading
    #[cfg(test)]
    pub fn place(&mut self, position: Vec3, direction: Vec3) {
        self.instance.transform.translation = position;
        self.direction = direction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn arena() -> [Character; 4] {
        [
            Character::new("paddle", HomeEdge::NegZ, 1.0),
            Character::new("paddle", HomeEdge::PosZ, 1.0),
            Character::new("paddle", HomeEdge::NegX, 1.0),
            Character::new("paddle", HomeEdge::PosX, 1.0),
        ]
    }

    #[test]
    fn test_serve_is_level_and_diagonal() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut ball = Ball::new("ball", 30.0, &mut rng);

        for _ in 0..32 {
            ball.reset(&mut rng);
            assert_relative_eq!(
                ball.position(),
                Vec3::new(0.0, PLAYER_HEIGHT, 0.0),
                epsilon = 1.0e-6
            );
            assert_relative_eq!(ball.direction.norm(), 1.0, epsilon = 1.0e-5);
            assert_relative_eq!(ball.direction.y, 0.0);
            assert!(ball.direction.x.abs() > 0.3, "flat serve {:?}", ball.direction);
            assert!(ball.direction.z.abs() > 0.3, "flat serve {:?}", ball.direction);
        }
    }

    #[test]
    fn test_ball_bounces_off_a_paddle_in_reach() {
        let characters = arena();
        let mut rng = StdRng::seed_from_u64(1);
        let mut ball = Ball::new("ball", 30.0, &mut rng);
        ball.place(
            Vec3::new(0.0, PLAYER_HEIGHT, -38.0),
            Vec3::new(0.0, 0.0, -1.0),
        );

        let escaped = ball.update(0.05, &characters);
        assert_eq!(escaped, None);
        assert!(ball.direction.z > 0.0, "bounce did not flip the heading");
        assert_relative_eq!(ball.position().z, -REFLECT_DISTANCE);
    }

    #[test]
    fn test_ball_escapes_past_an_uncovered_edge() {
        let characters = arena();
        let mut rng = StdRng::seed_from_u64(1);
        let mut ball = Ball::new("ball", 30.0, &mut rng);
        // outside the paddle's half length, straight at the edge
        ball.place(
            Vec3::new(10.0, PLAYER_HEIGHT, -37.0),
            Vec3::new(0.0, 0.0, -1.0),
        );

        assert_eq!(ball.update(0.2, &characters), None);
        assert_eq!(ball.update(0.2, &characters), Some(HomeEdge::NegZ));
    }

    #[test]
    fn test_paddle_cannot_reach_a_ball_already_past_it() {
        let characters = arena();
        let mut rng = StdRng::seed_from_u64(1);
        let mut ball = Ball::new("ball", 30.0, &mut rng);
        // lined up with the paddle, but already behind it
        ball.place(
            Vec3::new(0.0, PLAYER_HEIGHT, -42.0),
            Vec3::new(0.0, 0.0, -1.0),
        );

        assert_eq!(ball.update(0.1, &characters), Some(HomeEdge::NegZ));
    }

    #[test]
    fn test_side_paddles_intercept_on_z() {
        let characters = arena();
        let mut rng = StdRng::seed_from_u64(1);
        let mut ball = Ball::new("ball", 30.0, &mut rng);
        ball.place(
            Vec3::new(38.0, PLAYER_HEIGHT, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        );

        let escaped = ball.update(0.05, &characters);
        assert_eq!(escaped, None);
        assert!(ball.direction.x < 0.0);
        assert_relative_eq!(ball.position().x, REFLECT_DISTANCE);
    }
}
