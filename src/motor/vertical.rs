//! Gravity, jump launch and the held-button extra height.

use glam::Vec3;

use super::CharacterMotor;
use crate::constants::JUMP_BUFFER_SECS;
use crate::events::{EventSink, MotorEvent};
use crate::input::MotorInput;
use crate::mover::CollisionMover;
use crate::vector_math::slerp_direction;

/// Progress of the current jump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpState {
    pub(super) jumping: bool,
    pub(super) holding_button: bool,
    pub(super) last_button_down: Option<f32>,
    pub(super) last_start_time: f32,
    pub(super) direction: Vec3,
}

impl Default for JumpState {
    fn default() -> Self {
        Self {
            jumping: false,
            holding_button: false,
            last_button_down: None,
            last_start_time: 0.0,
            direction: Vec3::Y,
        }
    }
}

impl JumpState {
    /// Whether a jump is in progress.
    #[must_use]
    pub const fn is_jumping(&self) -> bool {
        self.jumping
    }

    /// Whether the button has been held since takeoff without the rise
    /// being blocked.
    #[must_use]
    pub const fn is_holding_button(&self) -> bool {
        self.holding_button
    }

    /// When the current press began, if the button is down and the press
    /// has not been spent on a jump.
    #[must_use]
    pub const fn last_button_down(&self) -> Option<f32> {
        self.last_button_down
    }

    /// Clock time of the latest takeoff.
    #[must_use]
    pub const fn last_start_time(&self) -> f32 {
        self.last_start_time
    }

    /// Launch direction of the latest jump.
    #[must_use]
    pub const fn direction(&self) -> Vec3 {
        self.direction
    }
}

impl<M: CollisionMover, S: EventSink> CharacterMotor<M, S> {
    /// Applies gravity and launches a buffered jump.
    pub(super) fn apply_gravity_and_jump(
        &mut self,
        mut velocity: Vec3,
        input: &MotorInput,
        dt: f32,
    ) -> Vec3 {
        if !input.jump {
            self.jump.holding_button = false;
            self.jump.last_button_down = None;
        } else if self.jump.last_button_down.is_none() {
            self.jump.last_button_down = Some(self.clock);
        }

        let gravity = self.config.movement.gravity;
        if self.ground.is_grounded() {
            velocity.y = velocity.y.min(0.0) - gravity * dt;
            if self.jump_buffered() {
                velocity = self.launch(velocity);
            } else {
                self.jump.holding_button = false;
            }
        } else {
            velocity.y = self.velocity.y - gravity * dt;
            if self.jump.jumping && self.jump.holding_button && self.in_extra_height_window() {
                // Cancel gravity, redirected along the launch direction.
                velocity += self.jump.direction * gravity * dt;
            }
            velocity.y = velocity.y.max(-self.config.movement.max_fall_speed);
        }
        velocity
    }

    fn jump_buffered(&self) -> bool {
        self.config.jumping.enabled
            && self
                .jump
                .last_button_down
                .is_some_and(|pressed| self.clock - pressed < JUMP_BUFFER_SECS)
    }

    fn in_extra_height_window(&self) -> bool {
        let jumping = &self.config.jumping;
        jumping.extra_jump_enabled
            && self.clock
                < self.jump.last_start_time
                    + jumping.extra_height / self.config.jump_launch_speed(jumping.base_height)
    }

    fn launch(&mut self, mut velocity: Vec3) -> Vec3 {
        let jumping = &self.config.jumping;
        let perp = if self.ground.is_too_steep(self.config.steep_threshold()) {
            jumping.steep_perp_amount
        } else {
            jumping.perp_amount
        };
        let height = if jumping.super_jump {
            jumping.super_jump_height
        } else {
            jumping.base_height
        };
        let direction = slerp_direction(Vec3::Y, self.ground.ground_normal(), perp);
        let launch_speed = self.config.jump_launch_speed(height);

        self.ground.leave_ground();
        self.jump = JumpState {
            jumping: true,
            holding_button: true,
            last_button_down: None,
            last_start_time: self.clock,
            direction,
        };
        velocity.y = 0.0;
        velocity += direction * launch_speed;
        if self.platform.config().transfers_velocity() {
            let inherited = self.platform.velocity();
            self.frame_velocity = inherited;
            velocity += inherited;
        }
        self.emit(MotorEvent::Jump);
        velocity
    }
}
