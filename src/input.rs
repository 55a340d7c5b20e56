//! Per-tick intent supplied by a player controller or AI.

use glam::Vec3;

/// What the character is being asked to do this tick.
///
/// Directions are world-space. `move_direction` is expected to be unit
/// length or zero; `look_direction` only steers the dashpack.
///
/// # Examples
///
/// ```
/// use character_motor::input::MotorInput;
/// use glam::Vec3;
/// let input = MotorInput::default().moving(Vec3::Z).with_jump(true);
/// assert!(input.can_control);
/// let frozen = input.without_control().gated();
/// assert_eq!(frozen.move_direction, Vec3::ZERO);
/// assert!(!frozen.jump);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorInput {
    /// Desired movement direction.
    pub move_direction: Vec3,
    /// Direction the character is looking.
    pub look_direction: Vec3,
    /// Jump (and jetpack/dashpack) button held.
    pub jump: bool,
    /// Sprint button held.
    pub sprint: bool,
    /// Whether the character responds to input at all.
    pub can_control: bool,
}

impl Default for MotorInput {
    fn default() -> Self {
        Self {
            move_direction: Vec3::ZERO,
            look_direction: Vec3::Z,
            jump: false,
            sprint: false,
            can_control: true,
        }
    }
}

impl MotorInput {
    /// Sets the movement direction.
    #[must_use]
    pub const fn moving(mut self, direction: Vec3) -> Self {
        self.move_direction = direction;
        self
    }

    /// Sets the look direction.
    #[must_use]
    pub const fn looking(mut self, direction: Vec3) -> Self {
        self.look_direction = direction;
        self
    }

    /// Sets the jump button state.
    #[must_use]
    pub const fn with_jump(mut self, held: bool) -> Self {
        self.jump = held;
        self
    }

    /// Sets the sprint button state.
    #[must_use]
    pub const fn with_sprint(mut self, held: bool) -> Self {
        self.sprint = held;
        self
    }

    /// Revokes control.
    #[must_use]
    pub const fn without_control(mut self) -> Self {
        self.can_control = false;
        self
    }

    /// The input the motor acts on: without control, movement and buttons
    /// read as idle.
    #[must_use]
    pub const fn gated(self) -> Self {
        if self.can_control {
            self
        } else {
            Self {
                move_direction: Vec3::ZERO,
                look_direction: self.look_direction,
                jump: false,
                sprint: false,
                can_control: false,
            }
        }
    }
}
