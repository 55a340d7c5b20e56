//! Horizontal velocity from input.
//!
//! Covers sprint resolution, the elliptical speed envelope, slope scaling,
//! sliding on steep ground and the per-tick acceleration limit.

use glam::Vec3;

use super::CharacterMotor;
use crate::config::TransferMode;
use crate::events::EventSink;
use crate::input::MotorInput;
use crate::meter::MeterTick;
use crate::mover::CollisionMover;
use crate::vector_math::{align_to_ground, elevation_degrees, horizontal, project_or_zero};

/// Top speed along a local-space direction (`+Z` forward, `+X` right).
///
/// The forward and backward halves of the envelope are quarter ellipses
/// whose sideways semi-axis is `sideways` and whose forward/back semi-axis
/// is `forward` or `backwards`. Only the direction of `local` matters for
/// the shape; the vertical component is ignored.
///
/// # Examples
///
/// ```
/// use character_motor::motor::max_speed_in_direction;
/// use glam::Vec3;
/// assert_eq!(max_speed_in_direction(Vec3::Z, 20.0, 10.0, 10.0), 20.0);
/// assert_eq!(max_speed_in_direction(Vec3::X, 20.0, 10.0, 10.0), 10.0);
/// assert_eq!(max_speed_in_direction(Vec3::ZERO, 20.0, 10.0, 10.0), 0.0);
/// ```
#[must_use]
pub fn max_speed_in_direction(local: Vec3, forward: f32, sideways: f32, backwards: f32) -> f32 {
    if horizontal(local) == Vec3::ZERO {
        return 0.0;
    }
    let along = if local.z > 0.0 { forward } else { backwards };
    let ratio = along / sideways;
    if !(ratio.is_finite() && ratio > 0.0) {
        // Degenerate envelope: only pure sideways motion has any speed.
        return if local.z == 0.0 { sideways } else { 0.0 };
    }
    let squashed = Vec3::new(local.x, 0.0, local.z / ratio).normalize_or_zero();
    Vec3::new(squashed.x, 0.0, squashed.z * ratio).length() * sideways
}

impl<M: CollisionMover, S: EventSink> CharacterMotor<M, S> {
    /// Steers `velocity` towards the velocity the input asks for.
    pub(super) fn apply_input_velocity(
        &mut self,
        mut velocity: Vec3,
        input: &MotorInput,
        dt: f32,
    ) -> Vec3 {
        self.resolve_sprint(input, dt);
        let grounded = self.ground.is_grounded();

        let mut desired = if self.is_sliding() {
            self.sliding_velocity(input.move_direction)
        } else {
            self.desired_horizontal_velocity(input.move_direction)
        };
        let platform = self.platform.config();
        if platform.enabled && platform.movement_transfer == TransferMode::PermaTransfer {
            desired += self.frame_velocity;
            desired.y = 0.0;
        }
        if grounded {
            desired = align_to_ground(desired, self.ground.ground_normal());
        } else {
            velocity.y = 0.0;
        }

        let change = (desired - velocity).clamp_length_max(self.max_acceleration(grounded) * dt);
        if grounded || self.jetpack.is_active() || self.dashpack.is_active() {
            velocity += change;
        } else if input.can_control {
            velocity += change * self.config.movement.air_control_factor;
        }
        if grounded {
            // Uphill the mover climbs on its own; only downhill needs help.
            velocity.y = velocity.y.min(0.0);
        }
        velocity
    }

    fn resolve_sprint(&mut self, input: &MotorInput, dt: f32) {
        if !self.config.sprint.enabled {
            return;
        }
        if self.sprint.try_activate(self.clock, input.sprint) {
            self.emit(self.sprint.ability().start_event());
        }
        let drain = dt * self.velocity.length() * self.config.sprint.drain_per_speed;
        if self.sprint.tick(dt, input.sprint, drain) == MeterTick::Stopped {
            self.emit(self.sprint.ability().stop_event());
        }
    }

    fn desired_horizontal_velocity(&self, move_direction: Vec3) -> Vec3 {
        let movement = &self.config.movement;
        let local = self.orientation.inverse() * move_direction;
        let forward = if self.sprint.is_active() {
            self.config.sprint.sprint_speed
        } else {
            movement.max_forward_speed
        };
        let mut speed = max_speed_in_direction(
            local,
            forward,
            movement.max_sideways_speed,
            movement.max_backwards_speed,
        );
        if self.ground.is_grounded() {
            speed *= movement
                .slope_speed_multiplier
                .evaluate(elevation_degrees(self.velocity));
        }
        self.orientation * (local * speed)
    }

    fn sliding_velocity(&self, move_direction: Vec3) -> Vec3 {
        let sliding = &self.config.sliding;
        let downhill = horizontal(self.ground.ground_normal()).normalize_or_zero();
        let along = project_or_zero(move_direction, downhill);
        let across = move_direction - along;
        (downhill + along * sliding.speed_control + across * sliding.sideways_control)
            * sliding.sliding_speed
    }

    fn max_acceleration(&self, grounded: bool) -> f32 {
        if !grounded {
            self.config.movement.max_air_acceleration
        } else if self.sprint.is_active() {
            self.config.sprint.sprint_accel
        } else {
            self.config.movement.max_ground_acceleration
        }
    }
}
