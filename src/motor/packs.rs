//! Jetpack and dashpack thrust.
//!
//! Both packs fire off the jump button while airborne and burn one unit of
//! fuel per second. They are independent: holding jump with both fitted
//! fires both.

use glam::Vec3;

use super::CharacterMotor;
use crate::events::EventSink;
use crate::input::MotorInput;
use crate::meter::MeterTick;
use crate::mover::CollisionMover;

impl<M: CollisionMover, S: EventSink> CharacterMotor<M, S> {
    /// Upward thrust that engages while falling.
    pub(super) fn apply_jetpack(&mut self, mut velocity: Vec3, input: &MotorInput, dt: f32) -> Vec3 {
        if !self.config.jetpack.enabled {
            return velocity;
        }
        let gate = input.jump && velocity.y < 0.0 && !self.ground.is_grounded();
        if self.jetpack.try_activate(self.clock, gate) {
            self.emit(self.jetpack.ability().start_event());
        }
        match self.jetpack.tick(dt, input.jump, dt) {
            MeterTick::Draining => {
                let jetpack = &self.config.jetpack;
                velocity.y = (velocity.y + jetpack.vertical_accel * dt).min(jetpack.max_vertical_speed);
            }
            MeterTick::Stopped => self.emit(self.jetpack.ability().stop_event()),
            MeterTick::Recharging => {}
        }
        velocity
    }

    /// Burst towards the look direction that also arrests a fall.
    pub(super) fn apply_dashpack(
        &mut self,
        mut velocity: Vec3,
        input: &MotorInput,
        dt: f32,
    ) -> Vec3 {
        if !self.config.dashpack.enabled {
            return velocity;
        }
        let gate = input.jump && !self.ground.is_grounded();
        if self.dashpack.try_activate(self.clock, gate) {
            self.emit(self.dashpack.ability().start_event());
        }
        match self.dashpack.tick(dt, input.jump, dt) {
            MeterTick::Draining => {
                let dashpack = &self.config.dashpack;
                if velocity.y < 0.0 {
                    velocity.y = (velocity.y + dashpack.vertical_accel * dt).min(0.0);
                }
                // Full 3-D speed, so a steep fall also counts.
                if velocity.length() < dashpack.max_speed {
                    let push = input.look_direction.normalize_or_zero() * dashpack.accel * dt;
                    velocity += push;
                    self.dash += push;
                }
            }
            MeterTick::Stopped => {
                self.dash = Vec3::ZERO;
                self.emit(self.dashpack.ability().stop_event());
            }
            MeterTick::Recharging => self.dash = Vec3::ZERO,
        }
        velocity
    }
}
