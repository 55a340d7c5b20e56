//! Tuning parameters for the character motor.
//!
//! Every section deserialises with defaults, so a JSON document only needs to
//! name the values it overrides:
//!
//! ```
//! use character_motor::config::MotorConfig;
//! let config = MotorConfig::from_json_str(r#"{ "movement": { "gravity": 20.0 } }"#).unwrap();
//! assert_eq!(config.movement.gravity, 20.0);
//! assert_eq!(config.movement.max_forward_speed, 10.0);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::curve::SpeedCurve;

/// Failure to load or accept a [`MotorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read motor config: {0}")]
    Io(#[from] std::io::Error),
    /// The document is not valid JSON for [`MotorConfig`].
    #[error("failed to parse motor config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is outside its accepted range.
    #[error("invalid motor config value `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// How velocity of the surface underfoot carries over into a jump or fall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransferMode {
    /// Platform movement does not affect the jump at all.
    None,
    /// The jump starts with the platform's velocity, which then decays under
    /// normal air control.
    InitTransfer,
    /// The jump starts with the platform's velocity and keeps it until
    /// landing.
    #[default]
    PermaTransfer,
    /// The character keeps moving with the last touched platform while
    /// airborne.
    PermaLocked,
}

impl TransferMode {
    /// Whether takeoff inherits the platform velocity.
    #[must_use]
    pub const fn inherits_velocity(self) -> bool {
        matches!(self, Self::InitTransfer | Self::PermaTransfer)
    }
}

/// Ground and air locomotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Top speed walking forwards.
    pub max_forward_speed: f32,
    /// Top speed strafing.
    pub max_sideways_speed: f32,
    /// Top speed walking backwards.
    pub max_backwards_speed: f32,
    /// Speed multiplier by slope angle in degrees (negative is downhill).
    pub slope_speed_multiplier: SpeedCurve,
    /// Largest velocity change per second on the ground.
    pub max_ground_acceleration: f32,
    /// Largest velocity change per second in the air.
    pub max_air_acceleration: f32,
    /// Downward acceleration.
    pub gravity: f32,
    /// Terminal fall speed.
    pub max_fall_speed: f32,
    /// Share of the air acceleration available to a controlled character.
    pub air_control_factor: f32,
    /// Steepest walkable slope, in degrees.
    pub slope_limit_degrees: f32,
    /// Height the mover can step onto; also the minimum ground snap distance.
    pub step_offset: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            max_forward_speed: 10.0,
            max_sideways_speed: 10.0,
            max_backwards_speed: 10.0,
            slope_speed_multiplier: SpeedCurve::default(),
            max_ground_acceleration: 30.0,
            max_air_acceleration: 20.0,
            gravity: 10.0,
            max_fall_speed: 20.0,
            air_control_factor: 0.4,
            slope_limit_degrees: 45.0,
            step_offset: 0.3,
        }
    }
}

/// Stamina-limited sprinting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SprintConfig {
    /// Whether the character can sprint.
    pub enabled: bool,
    /// Forward top speed while sprinting.
    pub sprint_speed: f32,
    /// Ground acceleration while sprinting.
    pub sprint_accel: f32,
    /// Full stamina.
    pub sprint_length: f32,
    /// Stamina regained per second while not sprinting.
    pub recovery_rate: f32,
    /// Seconds between sprint activations.
    pub cooldown: f32,
    /// Stamina drained per second for every unit of speed.
    pub drain_per_speed: f32,
}

impl Default for SprintConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sprint_speed: 20.0,
            sprint_accel: 60.0,
            sprint_length: 4.0,
            recovery_rate: 1.0,
            cooldown: 0.5,
            drain_per_speed: 0.125,
        }
    }
}

/// Jumping with variable height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    /// Whether the character can jump.
    pub enabled: bool,
    /// Apex height of a tapped jump.
    pub base_height: f32,
    /// Whether holding the button extends the jump.
    pub extra_jump_enabled: bool,
    /// Additional height reachable by holding the button.
    pub extra_height: f32,
    /// How far walkable-ground jumps lean towards the surface normal
    /// (0 is straight up, 1 is perpendicular to the surface).
    pub perp_amount: f32,
    /// Same as `perp_amount`, for ground that is too steep to walk on.
    pub steep_perp_amount: f32,
    /// Whether jumps use `super_jump_height` instead of `base_height`.
    pub super_jump: bool,
    /// Apex height of a super jump.
    pub super_jump_height: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_height: 1.0,
            extra_jump_enabled: true,
            extra_height: 4.1,
            perp_amount: 0.0,
            steep_perp_amount: 0.5,
            super_jump: false,
            super_jump_height: 20.0,
        }
    }
}

/// Vertical thrust while falling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JetpackConfig {
    /// Whether the jetpack is fitted.
    pub enabled: bool,
    /// Upward acceleration.
    pub vertical_accel: f32,
    /// Fastest upward speed the thrust will produce.
    pub max_vertical_speed: f32,
    /// Seconds of thrust on a full tank.
    pub max_fuel: f32,
    /// Fuel regained per second while idle.
    pub recharge_rate: f32,
    /// Seconds between activations.
    pub cooldown: f32,
}

impl Default for JetpackConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            vertical_accel: 1.0,
            max_vertical_speed: 1.0,
            max_fuel: 4.0,
            recharge_rate: 1.0,
            cooldown: 1.0,
        }
    }
}

/// Burst movement towards the look direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashpackConfig {
    /// Whether the dashpack is fitted.
    pub enabled: bool,
    /// Acceleration along the look direction.
    pub accel: f32,
    /// Deceleration of a fall while dashing.
    pub vertical_accel: f32,
    /// Speed above which the dash stops accelerating.
    pub max_speed: f32,
    /// Seconds of dash on a full tank.
    pub max_fuel: f32,
    /// Fuel regained per second while idle.
    pub recharge_rate: f32,
    /// Seconds between activations.
    pub cooldown: f32,
}

impl Default for DashpackConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            accel: 1.0,
            vertical_accel: 1.0,
            max_speed: 20.0,
            max_fuel: 4.0,
            recharge_rate: 1.0,
            cooldown: 1.0,
        }
    }
}

/// Sliding down ground that is too steep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlidingConfig {
    /// Whether steep ground makes the character slide.
    pub enabled: bool,
    /// Speed of the slide.
    pub sliding_speed: f32,
    /// Cross-slope steering as a fraction of the sliding speed.
    pub sideways_control: f32,
    /// Along-slope speed adjustment as a fraction of the sliding speed.
    pub speed_control: f32,
}

impl Default for SlidingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sliding_speed: 15.0,
            sideways_control: 1.0,
            speed_control: 0.4,
        }
    }
}

/// Moving platform support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Whether the character rides moving platforms.
    pub enabled: bool,
    /// How platform velocity carries into jumps and falls.
    pub movement_transfer: TransferMode,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            movement_transfer: TransferMode::PermaTransfer,
        }
    }
}

impl PlatformConfig {
    /// Whether takeoff and landing exchange velocity with the platform.
    #[must_use]
    pub const fn transfers_velocity(&self) -> bool {
        self.enabled && self.movement_transfer.inherits_velocity()
    }
}

/// Complete motor configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorConfig {
    /// Locomotion.
    pub movement: MovementConfig,
    /// Sprinting.
    pub sprint: SprintConfig,
    /// Jumping.
    pub jumping: JumpConfig,
    /// Jetpack.
    pub jetpack: JetpackConfig,
    /// Dashpack.
    pub dashpack: DashpackConfig,
    /// Steep-ground sliding.
    pub sliding: SlidingConfig,
    /// Moving platforms.
    pub platform: PlatformConfig,
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be finite and non-negative",
        })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be finite and positive",
        })
    }
}

fn unit_interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must lie within [0, 1]",
        })
    }
}

impl MotorConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value is out of range.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`MotorConfig::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks every value against its accepted range.
    ///
    /// # Errors
    /// Returns the first [`ConfigError::Invalid`] encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.movement;
        non_negative("movement.max_forward_speed", m.max_forward_speed)?;
        positive("movement.max_sideways_speed", m.max_sideways_speed)?;
        non_negative("movement.max_backwards_speed", m.max_backwards_speed)?;
        non_negative("movement.max_ground_acceleration", m.max_ground_acceleration)?;
        non_negative("movement.max_air_acceleration", m.max_air_acceleration)?;
        positive("movement.gravity", m.gravity)?;
        positive("movement.max_fall_speed", m.max_fall_speed)?;
        unit_interval("movement.air_control_factor", m.air_control_factor)?;
        non_negative("movement.step_offset", m.step_offset)?;
        if !(m.slope_limit_degrees > 0.0 && m.slope_limit_degrees <= 90.0) {
            return Err(ConfigError::Invalid {
                field: "movement.slope_limit_degrees",
                reason: "must lie within (0, 90]",
            });
        }
        if !m.slope_speed_multiplier.is_well_formed() {
            return Err(ConfigError::Invalid {
                field: "movement.slope_speed_multiplier",
                reason: "keys must be finite, non-empty and sorted by angle",
            });
        }

        let s = &self.sprint;
        non_negative("sprint.sprint_speed", s.sprint_speed)?;
        non_negative("sprint.sprint_accel", s.sprint_accel)?;
        non_negative("sprint.sprint_length", s.sprint_length)?;
        non_negative("sprint.recovery_rate", s.recovery_rate)?;
        non_negative("sprint.cooldown", s.cooldown)?;
        non_negative("sprint.drain_per_speed", s.drain_per_speed)?;

        let j = &self.jumping;
        positive("jumping.base_height", j.base_height)?;
        non_negative("jumping.extra_height", j.extra_height)?;
        unit_interval("jumping.perp_amount", j.perp_amount)?;
        unit_interval("jumping.steep_perp_amount", j.steep_perp_amount)?;
        non_negative("jumping.super_jump_height", j.super_jump_height)?;

        let jp = &self.jetpack;
        non_negative("jetpack.vertical_accel", jp.vertical_accel)?;
        non_negative("jetpack.max_vertical_speed", jp.max_vertical_speed)?;
        non_negative("jetpack.max_fuel", jp.max_fuel)?;
        non_negative("jetpack.recharge_rate", jp.recharge_rate)?;
        non_negative("jetpack.cooldown", jp.cooldown)?;

        let d = &self.dashpack;
        non_negative("dashpack.accel", d.accel)?;
        non_negative("dashpack.vertical_accel", d.vertical_accel)?;
        non_negative("dashpack.max_speed", d.max_speed)?;
        non_negative("dashpack.max_fuel", d.max_fuel)?;
        non_negative("dashpack.recharge_rate", d.recharge_rate)?;
        non_negative("dashpack.cooldown", d.cooldown)?;

        let sl = &self.sliding;
        non_negative("sliding.sliding_speed", sl.sliding_speed)?;
        non_negative("sliding.sideways_control", sl.sideways_control)?;
        non_negative("sliding.speed_control", sl.speed_control)?;
        Ok(())
    }

    /// Cosine of the slope limit; ground normals at or below it are too
    /// steep to walk on.
    #[must_use]
    pub fn steep_threshold(&self) -> f32 {
        self.movement.slope_limit_degrees.to_radians().cos()
    }

    /// Launch speed that reaches `height` under this configuration's gravity.
    #[must_use]
    pub fn jump_launch_speed(&self, height: f32) -> f32 {
        (2.0 * height * self.movement.gravity).sqrt()
    }
}
