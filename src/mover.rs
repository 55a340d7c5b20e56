//! The sweep-and-slide primitive the motor drives.
//!
//! Collision resolution belongs to the host engine. The motor hands it a
//! desired displacement once per tick through [`CollisionMover`] and learns
//! about every touched surface from the contact callback. [`PlaneMover`] is
//! a minimal implementation over an infinite floor, used by the
//! `motor-sim` binary and by tests.

use glam::Vec3;

use crate::platform::PlatformId;

/// Which sides of the character touched something during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionFlags {
    /// Blocked from above (a ceiling).
    pub above: bool,
    /// Supported from below.
    pub below: bool,
    /// Blocked sideways.
    pub sides: bool,
}

impl CollisionFlags {
    /// No contact at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            above: false,
            below: false,
            sides: false,
        }
    }

    /// Whether any side reported contact.
    #[must_use]
    pub const fn any(self) -> bool {
        self.above || self.below || self.sides
    }
}

/// One surface touched during a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Surface normal at the contact, pointing towards the character.
    pub normal: Vec3,
    /// World-space contact point.
    pub point: Vec3,
    /// Direction the character was moving when it made contact.
    pub move_direction: Vec3,
    /// The body that was touched, if it can carry the character.
    pub body: Option<PlatformId>,
}

/// A kinematic capsule that moves by sweeping and sliding along geometry.
pub trait CollisionMover {
    /// Current world position of the character's reference point.
    fn position(&self) -> Vec3;

    /// Sweeps the character by `displacement`, sliding along whatever it
    /// hits.
    ///
    /// `on_contact` is called synchronously, once per touched surface,
    /// before this returns.
    fn move_and_slide(
        &mut self,
        displacement: Vec3,
        on_contact: &mut dyn FnMut(&Contact),
    ) -> CollisionFlags;

    /// Shifts the character by `offset` without collision checks.
    fn teleport(&mut self, offset: Vec3);
}

impl<M: CollisionMover + ?Sized> CollisionMover for Box<M> {
    fn position(&self) -> Vec3 {
        (**self).position()
    }

    fn move_and_slide(
        &mut self,
        displacement: Vec3,
        on_contact: &mut dyn FnMut(&Contact),
    ) -> CollisionFlags {
        (**self).move_and_slide(displacement, on_contact)
    }

    fn teleport(&mut self, offset: Vec3) {
        (**self).teleport(offset);
    }
}

/// A mover over an infinite horizontal floor with an optional ceiling.
///
/// The position is the character's feet. The floor height and the body it
/// belongs to may be changed between ticks to emulate lifts.
///
/// # Examples
///
/// ```
/// use character_motor::mover::{CollisionMover, PlaneMover};
/// use glam::Vec3;
/// let mut mover = PlaneMover::new(Vec3::new(0.0, 1.0, 0.0));
/// let mut contacts = 0;
/// let flags = mover.move_and_slide(Vec3::new(1.0, -3.0, 0.0), &mut |_| contacts += 1);
/// assert!(flags.below);
/// assert_eq!(contacts, 1);
/// assert_eq!(mover.position(), Vec3::new(1.0, 0.0, 0.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneMover {
    position: Vec3,
    /// Height of the floor.
    pub floor_height: f32,
    /// Body the floor belongs to.
    pub floor_body: Option<PlatformId>,
    /// Height of the ceiling, if any.
    pub ceiling_height: Option<f32>,
    /// Height of the character, used against the ceiling.
    pub height: f32,
}

impl PlaneMover {
    /// Places the character at `position` above a floor at height zero.
    #[must_use]
    pub const fn new(position: Vec3) -> Self {
        Self {
            position,
            floor_height: 0.0,
            floor_body: None,
            ceiling_height: None,
            height: 2.0,
        }
    }

    /// Tags the floor as belonging to `body`.
    #[must_use]
    pub const fn with_floor_body(mut self, body: PlatformId) -> Self {
        self.floor_body = Some(body);
        self
    }

    /// Adds a ceiling at `height`.
    #[must_use]
    pub const fn with_ceiling(mut self, height: f32) -> Self {
        self.ceiling_height = Some(height);
        self
    }
}

impl CollisionMover for PlaneMover {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn move_and_slide(
        &mut self,
        displacement: Vec3,
        on_contact: &mut dyn FnMut(&Contact),
    ) -> CollisionFlags {
        let mut flags = CollisionFlags::none();
        let mut target = self.position + displacement;
        let direction = displacement.normalize_or_zero();

        if let Some(ceiling) = self.ceiling_height {
            let head_room = ceiling - self.height;
            if target.y > head_room && displacement.y > 0.0 {
                target.y = head_room.max(self.position.y);
                flags.above = true;
                on_contact(&Contact {
                    normal: Vec3::NEG_Y,
                    point: Vec3::new(target.x, ceiling, target.z),
                    move_direction: direction,
                    body: None,
                });
            }
        }

        if target.y <= self.floor_height && displacement.y < 0.0 {
            target.y = self.floor_height;
            flags.below = true;
            on_contact(&Contact {
                normal: Vec3::Y,
                point: Vec3::new(target.x, self.floor_height, target.z),
                move_direction: direction,
                body: self.floor_body,
            });
        } else if target.y < self.floor_height {
            target.y = self.floor_height;
        }

        self.position = target;
        flags
    }

    fn teleport(&mut self, offset: Vec3) {
        self.position += offset;
    }
}
