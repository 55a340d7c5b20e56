//! Fixed thresholds used by the motor.
//!
//! Tunable quantities live in [`crate::config::MotorConfig`]; the values here
//! are numerical guards that callers are not expected to change.

/// A ground normal with a vertical component above this value counts as
/// standing on something.
pub const GROUNDED_NORMAL_Y: f32 = 0.01;
/// Seconds a jump press stays buffered so a press just before landing still
/// triggers a jump.
pub const JUMP_BUFFER_SECS: f32 = 0.2;
/// Squared distance below which a contact point is treated as the previous
/// tick's hit point.
pub const HIT_POINT_EPSILON_SQ: f32 = 0.001;
/// Tolerance when comparing the realised vertical speed to the commanded one.
pub const VERTICAL_SPEED_EPSILON: f32 = 0.001;
/// Scale applied to a kickback impulse received while airborne.
pub const AIRBORNE_KICKBACK_SCALE: f32 = 0.125;
/// Physics ticks a landing on a freshly bound platform waits before the
/// platform velocity is subtracted.
pub const PLATFORM_CORRECTION_DELAY_TICKS: u8 = 2;
