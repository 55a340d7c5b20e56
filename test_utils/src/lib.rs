//! Utility helpers for tests.
//!
//! Shared fixtures for the integration tests: a [`ScriptedMover`] that
//! replays canned sweep outcomes, motor builders and tick helpers.

mod scripted;

pub use scripted::{Blocking, ScriptedMover, Sweep};

use character_motor::{
    CharacterMotor, CollisionMover, EventLog, EventSink, MotorConfig, MotorInput, PlaneMover,
    PlatformSource,
};
use glam::Vec3;

/// Tick length used throughout the tests.
pub const DT: f32 = 0.02;

/// A motor over [`PlaneMover`] that records its events.
pub type PlaneMotor = CharacterMotor<PlaneMover, EventLog>;

/// A motor standing on a flat floor at the origin.
///
/// # Panics
/// Panics if `config` fails validation.
pub fn flat_ground_motor(config: MotorConfig) -> PlaneMotor {
    CharacterMotor::new(config, PlaneMover::new(Vec3::ZERO), EventLog::new())
        .expect("test motor config should be valid")
}

/// A motor falling from `height` above a flat floor.
///
/// # Panics
/// Panics if `config` fails validation.
pub fn airborne_motor(config: MotorConfig, height: f32) -> PlaneMotor {
    CharacterMotor::new(
        config,
        PlaneMover::new(Vec3::new(0.0, height, 0.0)),
        EventLog::new(),
    )
    .expect("test motor config should be valid")
    .starting_airborne()
}

/// Runs `ticks` ticks with the same input.
pub fn tick_n<M, S>(
    motor: &mut CharacterMotor<M, S>,
    ticks: usize,
    input: &MotorInput,
    platforms: &impl PlatformSource,
) where
    M: CollisionMover,
    S: EventSink,
{
    for _ in 0..ticks {
        motor.tick(DT, input, platforms);
    }
}

/// Ticks until `done` holds, giving up after `max_ticks`.
///
/// Returns the number of ticks run, or `None` if `done` never held.
pub fn tick_until<M, S>(
    motor: &mut CharacterMotor<M, S>,
    max_ticks: usize,
    input: &MotorInput,
    platforms: &impl PlatformSource,
    mut done: impl FnMut(&CharacterMotor<M, S>) -> bool,
) -> Option<usize>
where
    M: CollisionMover,
    S: EventSink,
{
    for tick in 1..=max_ticks {
        motor.tick(DT, input, platforms);
        if done(motor) {
            return Some(tick);
        }
    }
    None
}
