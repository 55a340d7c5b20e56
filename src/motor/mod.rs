//! The per-tick character motion integrator.
//!
//! [`CharacterMotor`] owns the character's velocity and drives an injected
//! [`CollisionMover`] once per tick. Each tick runs in a fixed order: the
//! platform velocity estimate is refreshed, then input, gravity, jumping and
//! the two thrust packs shape a commanded velocity. The ridden platform
//! carries the character, the mover sweeps the commanded displacement, and
//! the achieved motion is reconciled into the recorded velocity before
//! ground transitions are resolved.
//!
//! ```
//! use character_motor::prelude::*;
//! use glam::Vec3;
//!
//! let mover = PlaneMover::new(Vec3::ZERO);
//! let mut motor = CharacterMotor::new(MotorConfig::default(), mover, EventLog::new()).unwrap();
//! motor.tick(0.02, &MotorInput::default().with_jump(true), &NoPlatforms);
//! assert!(motor.events().contains(MotorEvent::Jump));
//! assert!((motor.velocity().y - 20.0_f32.sqrt()).abs() < 1e-3);
//! ```

mod locomotion;
mod packs;
mod vertical;

pub use locomotion::max_speed_in_direction;
pub use vertical::JumpState;

use glam::{Quat, Vec3};
use log::{debug, trace};

use crate::config::{ConfigError, MotorConfig};
use crate::constants::{AIRBORNE_KICKBACK_SCALE, VERTICAL_SPEED_EPSILON};
use crate::events::{EventSink, MotorEvent};
use crate::ground::{GroundContactTracker, GroundTransition};
use crate::input::MotorInput;
use crate::meter::{Ability, ResourceMeter};
use crate::mover::{CollisionFlags, CollisionMover};
use crate::platform::{LandingCorrection, PlatformBinding, PlatformSource};
use crate::vector_math::horizontal;

/// A kinematic character driven by intent and resolved by a collision mover.
///
/// `M` performs the sweeps and `S` receives the [`MotorEvent`]s. Both are
/// owned; pass `&mut` references to keep them outside the motor.
#[derive(Debug, Clone)]
pub struct CharacterMotor<M, S> {
    config: MotorConfig,
    mover: M,
    events: S,
    clock: f32,
    orientation: Quat,
    velocity: Vec3,
    frame_velocity: Vec3,
    collision_flags: CollisionFlags,
    ground: GroundContactTracker,
    platform: PlatformBinding,
    jump: JumpState,
    sprint: ResourceMeter,
    jetpack: ResourceMeter,
    dashpack: ResourceMeter,
    dash: Vec3,
    kickback: Option<Vec3>,
    move_direction: Vec3,
}

impl<M: CollisionMover, S: EventSink> CharacterMotor<M, S> {
    /// Creates a motor standing on flat ground, with full meters.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when `config` fails validation.
    pub fn new(config: MotorConfig, mover: M, events: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let sprint = ResourceMeter::new(
            Ability::Sprint,
            config.sprint.sprint_length,
            config.sprint.recovery_rate,
            config.sprint.cooldown,
        );
        let jetpack = ResourceMeter::new(
            Ability::Jetpack,
            config.jetpack.max_fuel,
            config.jetpack.recharge_rate,
            config.jetpack.cooldown,
        );
        let dashpack = ResourceMeter::new(
            Ability::Dashpack,
            config.dashpack.max_fuel,
            config.dashpack.recharge_rate,
            config.dashpack.cooldown,
        );
        let platform = PlatformBinding::new(config.platform.clone());
        Ok(Self {
            config,
            mover,
            events,
            clock: 0.0,
            orientation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            frame_velocity: Vec3::ZERO,
            collision_flags: CollisionFlags::none(),
            ground: GroundContactTracker::grounded(),
            platform,
            jump: JumpState::default(),
            sprint,
            jetpack,
            dashpack,
            dash: Vec3::ZERO,
            kickback: None,
            move_direction: Vec3::ZERO,
        })
    }

    /// Starts the character in the air instead of on the ground.
    #[must_use]
    pub fn starting_airborne(mut self) -> Self {
        self.ground = GroundContactTracker::airborne();
        self
    }

    /// Sets the initial orientation.
    #[must_use]
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation.normalize();
        self
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Returns the collision flags of the main sweep. A non-positive or
    /// non-finite `dt` leaves every piece of state untouched.
    pub fn tick(
        &mut self,
        dt: f32,
        input: &MotorInput,
        platforms: &impl PlatformSource,
    ) -> CollisionFlags {
        if !(dt.is_finite() && dt > 0.0) {
            trace!("ignoring tick with dt {dt}");
            return self.collision_flags;
        }
        self.clock += dt;
        let input = input.gated();
        self.move_direction = input.move_direction;

        self.platform.update_velocity(dt, platforms);
        if let Some(correction) = self.platform.advance_pending(self.ground.is_grounded()) {
            self.velocity -= correction;
        }

        let mut velocity = self.velocity;
        velocity = self.apply_input_velocity(velocity, &input, dt);
        velocity = self.apply_gravity_and_jump(velocity, &input, dt);
        velocity = self.apply_jetpack(velocity, &input, dt);
        velocity = self.apply_dashpack(velocity, &input, dt);

        self.ride_platform(platforms);

        let last_position = self.mover.position();
        let mut displacement = velocity * dt;
        let push_down = self
            .config
            .movement
            .step_offset
            .max(horizontal(displacement).length());
        let grounded_before = self.ground.is_grounded();
        if grounded_before {
            displacement.y -= push_down;
        }
        if let Some(kick) = self.kickback.take() {
            displacement += if grounded_before {
                kick
            } else {
                kick * AIRBORNE_KICKBACK_SCALE
            };
        }

        self.collision_flags = self.sweep(displacement);
        self.platform
            .rebind_if_changed(platforms, self.mover.position(), self.orientation);
        self.reconcile(velocity, last_position, dt);

        match self.ground.resolve_transition() {
            Some(GroundTransition::LeftGround) => self.fall(push_down),
            Some(GroundTransition::Landed) => self.land(),
            None => {}
        }

        if self.platform.carries(self.ground.is_grounded()) {
            self.platform
                .capture_anchor(platforms, self.mover.position(), self.orientation);
        }
        self.collision_flags
    }

    /// Moves the character along with the platform it rides, turning it by
    /// the platform's yaw.
    fn ride_platform(&mut self, platforms: &impl PlatformSource) {
        if !self.platform.carries(self.ground.is_grounded()) {
            return;
        }
        let Some((displacement, yaw)) = self.platform.carried_motion(platforms) else {
            return;
        };
        if displacement != Vec3::ZERO {
            self.mover.move_and_slide(displacement, &mut |_| {});
        }
        if yaw != 0.0 {
            self.orientation = (self.orientation * Quat::from_rotation_y(yaw)).normalize();
        }
    }

    /// Runs the main sweep, feeding every contact to the ground tracker.
    fn sweep(&mut self, displacement: Vec3) -> CollisionFlags {
        let ground = &mut self.ground;
        let platform = &mut self.platform;
        let frame_velocity = &mut self.frame_velocity;
        ground.begin_sweep();
        platform.begin_sweep();
        let flags = self.mover.move_and_slide(displacement, &mut |contact| {
            if ground.record_contact(contact) {
                platform.record_hit(contact.body);
                *frame_velocity = Vec3::ZERO;
            }
        });
        ground.finish_sweep();
        flags
    }

    /// Rebuilds the recorded velocity from the motion the mover achieved.
    ///
    /// Horizontal motion is projected onto the commanded direction and kept
    /// within `[0, 1]` of the commanded magnitude, so being pushed around by
    /// collisions never shows up as acceleration.
    fn reconcile(&mut self, commanded: Vec3, last_position: Vec3, dt: f32) {
        let measured = (self.mover.position() - last_position) / dt;
        let old_horizontal = horizontal(commanded);
        let length_sq = old_horizontal.length_squared();
        let kept = if length_sq > 0.0 {
            let share = horizontal(measured).dot(old_horizontal) / length_sq;
            old_horizontal * share.clamp(0.0, 1.0)
        } else {
            Vec3::ZERO
        };
        let mut vertical = measured.y;
        if vertical < commanded.y - VERTICAL_SPEED_EPSILON {
            if vertical < 0.0 {
                // Pushed down harder than commanded: the step-down bias, not
                // a real fall.
                vertical = commanded.y;
            } else {
                self.jump.holding_button = false;
            }
        }
        self.velocity = Vec3::new(kept.x, vertical, kept.z);
    }

    fn fall(&mut self, push_down: f32) {
        if self.platform.config().transfers_velocity() {
            let inherited = self.platform.velocity();
            self.frame_velocity = inherited;
            self.velocity += inherited;
        }
        self.emit(MotorEvent::Fall);
        self.mover.teleport(Vec3::Y * push_down);
    }

    fn land(&mut self) {
        self.jump.jumping = false;
        if self.jetpack.force_stop() {
            self.emit(self.jetpack.ability().stop_event());
        }
        if self.dashpack.force_stop() {
            self.emit(self.dashpack.ability().stop_event());
            self.dash = Vec3::ZERO;
        }
        if let LandingCorrection::Immediate(correction) = self.platform.on_landing() {
            self.velocity -= correction;
        }
        self.emit(MotorEvent::Land);
    }

    fn emit(&mut self, event: MotorEvent) {
        debug!("motor event {event} at t={:.3}", self.clock);
        self.events.emit(event);
    }

    /// Overwrites the velocity from outside, e.g. for knockback.
    ///
    /// The character leaves the ground and loses any inherited platform
    /// velocity.
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.ground.leave_ground();
        self.velocity = velocity;
        self.frame_velocity = Vec3::ZERO;
        self.emit(MotorEvent::ExternalVelocity);
    }

    /// Queues a displacement added to the next sweep only, bypassing the
    /// acceleration limits. Airborne characters receive an eighth of it.
    pub fn kickback(&mut self, displacement: Vec3) {
        self.kickback = Some(displacement);
    }

    /// Switches super jumps on or off.
    pub fn set_super_jump(&mut self, enabled: bool) {
        self.config.jumping.super_jump = enabled;
    }

    /// Sets the facing used to interpret movement input.
    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation.normalize();
    }
}

impl<M: CollisionMover, S> CharacterMotor<M, S> {
    /// World position reported by the mover.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.mover.position()
    }
}

impl<M, S> CharacterMotor<M, S> {
    /// Whether the character stands on walkable or steep ground.
    #[must_use]
    pub const fn is_grounded(&self) -> bool {
        self.ground.is_grounded()
    }

    /// Whether a jump is in progress.
    #[must_use]
    pub const fn is_jumping(&self) -> bool {
        self.jump.jumping
    }

    /// Whether the character is sliding down ground that is too steep.
    #[must_use]
    pub fn is_sliding(&self) -> bool {
        self.ground.is_grounded()
            && self.config.sliding.enabled
            && self.ground.is_too_steep(self.config.steep_threshold())
    }

    /// Whether the recorded velocity points downwards.
    #[must_use]
    pub fn is_falling(&self) -> bool {
        self.velocity.y < 0.0
    }

    /// Whether the last sweep was blocked from above.
    #[must_use]
    pub const fn is_touching_ceiling(&self) -> bool {
        self.collision_flags.above
    }

    /// Whether the character is sprinting.
    #[must_use]
    pub const fn is_sprinting(&self) -> bool {
        self.sprint.is_active()
    }

    /// Whether the jetpack is firing.
    #[must_use]
    pub const fn is_jetpacking(&self) -> bool {
        self.jetpack.is_active()
    }

    /// Whether the dashpack is firing.
    #[must_use]
    pub const fn is_dashpacking(&self) -> bool {
        self.dashpack.is_active()
    }

    /// Whether a sprint could start now.
    #[must_use]
    pub fn can_sprint(&self) -> bool {
        self.config.sprint.enabled && self.sprint.is_ready(self.clock)
    }

    /// Whether the jetpack could fire now.
    #[must_use]
    pub fn can_jetpack(&self) -> bool {
        self.config.jetpack.enabled
            && !self.ground.is_grounded()
            && self.jetpack.is_ready(self.clock)
    }

    /// Whether the dashpack could fire now.
    #[must_use]
    pub fn can_dashpack(&self) -> bool {
        self.config.dashpack.enabled
            && !self.ground.is_grounded()
            && self.dashpack.is_ready(self.clock)
    }

    /// Velocity accumulated by the current dash.
    #[must_use]
    pub const fn dash(&self) -> Vec3 {
        self.dash
    }

    /// Sprint stamina.
    #[must_use]
    pub const fn sprint_meter(&self) -> &ResourceMeter {
        &self.sprint
    }

    /// Jetpack fuel.
    #[must_use]
    pub const fn jetpack_meter(&self) -> &ResourceMeter {
        &self.jetpack
    }

    /// Dashpack fuel.
    #[must_use]
    pub const fn dashpack_meter(&self) -> &ResourceMeter {
        &self.dashpack
    }

    /// Velocity recorded at the end of the last tick.
    #[must_use]
    pub const fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Platform velocity inherited at takeoff.
    #[must_use]
    pub const fn frame_velocity(&self) -> Vec3 {
        self.frame_velocity
    }

    /// Collision flags of the last sweep.
    #[must_use]
    pub const fn collision_flags(&self) -> CollisionFlags {
        self.collision_flags
    }

    /// Simulation time: the sum of every accepted `dt`.
    #[must_use]
    pub const fn clock(&self) -> f32 {
        self.clock
    }

    /// Current facing.
    #[must_use]
    pub const fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Movement direction of the last tick, after control gating.
    #[must_use]
    pub const fn move_direction(&self) -> Vec3 {
        self.move_direction
    }

    /// Configuration in force.
    #[must_use]
    pub const fn config(&self) -> &MotorConfig {
        &self.config
    }

    /// Ground contact state.
    #[must_use]
    pub const fn ground(&self) -> &GroundContactTracker {
        &self.ground
    }

    /// Moving platform state.
    #[must_use]
    pub const fn platform(&self) -> &PlatformBinding {
        &self.platform
    }

    /// Jump state.
    #[must_use]
    pub const fn jump_state(&self) -> &JumpState {
        &self.jump
    }

    /// The event sink.
    #[must_use]
    pub const fn events(&self) -> &S {
        &self.events
    }

    /// The event sink, mutably, e.g. to drain a log.
    pub fn events_mut(&mut self) -> &mut S {
        &mut self.events
    }

    /// The collision mover.
    #[must_use]
    pub const fn mover(&self) -> &M {
        &self.mover
    }

    /// The collision mover, mutably, e.g. to reshape its world.
    pub fn mover_mut(&mut self) -> &mut M {
        &mut self.mover
    }
}

#[cfg(test)]
mod tests;
